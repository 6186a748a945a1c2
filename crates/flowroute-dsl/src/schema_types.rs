// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
// Node definition types.
//
// This file is included by lib.rs and has access to its imports
// (JsonSchema, Serialize, Deserialize, HashMap).

// ============================================================================
// Node Definition
// ============================================================================

/// A single configured node: identity, behaviour flags and typed parameters.
///
/// Example:
/// ```json
/// {
///   "id": "a1b2",
///   "name": "Is adult?",
///   "type": "If",
///   "parameters": { "conditions": { "conditions": [], "combinator": "and" } }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "Node")]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Stable node identifier (used for node-scoped deduplication history)
    pub id: String,

    /// Human-readable node name
    pub name: String,

    /// Node type and parameters
    #[serde(flatten)]
    pub kind: NodeKind,

    /// Recover from item-level errors instead of failing the node
    #[serde(default)]
    pub continue_on_fail: bool,
}

/// Node type discriminator with its parameters.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "parameters")]
pub enum NodeKind {
    /// Route items to a true or false output
    If(IfParameters),
    /// Keep items matching a condition group
    Filter(FilterParameters),
    /// Route items to one of several outputs
    Switch(SwitchParameters),
    /// Build items from assigned fields (Edit Fields)
    Set(SetParameters),
    /// Drop duplicate items, within the input or across executions
    RemoveDuplicates(RemoveDuplicatesParameters),
}

// ============================================================================
// Mapping Values
// ============================================================================

/// A parameter value resolved against each input item.
///
/// Uses explicit `valueType` discriminator:
/// - `reference`: path into the item JSON (e.g., "customer.address.city")
/// - `immediate`: literal JSON value
/// - `template`: text template rendered with the item bound as `json`
/// - `composite`: structured object or array with nested MappingValues
///
/// Example reference: `{ "valueType": "reference", "value": "customer.name" }`
/// Example template: `{ "valueType": "template", "value": "{{ json.first }} {{ json.last }}" }`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "valueType", rename_all = "lowercase")]
pub enum MappingValue {
    /// Reference to item data at a dot path
    Reference(ReferenceValue),

    /// Immediate/literal value (string, number, boolean, object, array)
    Immediate(ImmediateValue),

    /// Text template rendered per item
    Template(TemplateValue),

    /// Composite value - structured object or array with nested MappingValues
    Composite(CompositeValue),
}

impl MappingValue {
    /// Shorthand for a reference value without default.
    pub fn reference(path: impl Into<String>) -> Self {
        MappingValue::Reference(ReferenceValue {
            value: path.into(),
            default: None,
        })
    }

    /// Shorthand for an immediate value.
    pub fn immediate(value: serde_json::Value) -> Self {
        MappingValue::Immediate(ImmediateValue { value })
    }
}

/// A reference to item data at a specific path.
///
/// Paths use dot notation: "customer.name", "lines.0.sku".
/// A leading `$json.` or `$.` is accepted and ignored.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceValue {
    /// Path to the data using dot notation
    pub value: String,

    /// Value to use when the path is missing or null
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

/// An immediate (literal) value.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImmediateValue {
    /// The literal value (string, number, boolean, object, or array)
    pub value: serde_json::Value,
}

/// A text template. The item JSON is bound as `json`, its position as `index`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateValue {
    /// Template source
    pub value: String,
}

/// A composite value that builds structured objects or arrays from nested MappingValues.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompositeValue {
    /// Either an object (HashMap) or array (Vec) of nested MappingValues.
    pub value: CompositeInner,
}

/// Inner value for CompositeValue - either an object or array of MappingValues.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CompositeInner {
    /// Object composite: each field maps to a MappingValue
    Object(HashMap<String, MappingValue>),
    /// Array composite: each element is a MappingValue
    Array(Vec<MappingValue>),
}

/// A list of field names, given either as a JSON array or as a
/// comma-separated string ("id, customer.email").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FieldList {
    /// Comma-separated field names
    Csv(String),
    /// Explicit list of field names
    List(Vec<String>),
}

// ============================================================================
// Condition Types
// ============================================================================

/// Operand type of a condition. Determines type validation and which
/// operations are available.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    strum::Display,
    strum::VariantNames,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum OperandType {
    String,
    Number,
    DateTime,
    Boolean,
    Array,
    Object,
}

/// Condition operations. Availability depends on the operand type,
/// see [`OperandType::operations`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    strum::Display,
    strum::AsRefStr,
    strum::VariantNames,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ConditionOperation {
    // Presence
    Exists,
    NotExists,
    Empty,
    NotEmpty,

    // Equality
    Equals,
    NotEquals,

    // String / array membership
    Contains,
    NotContains,
    StartsWith,
    NotStartsWith,
    EndsWith,
    NotEndsWith,
    Regex,
    NotRegex,

    // Numeric ordering
    Gt,
    Lt,
    Gte,
    Lte,

    // Date ordering
    After,
    Before,
    AfterOrEquals,
    BeforeOrEquals,

    // Boolean
    True,
    False,

    // Array length
    LengthEquals,
    LengthNotEquals,
    LengthGt,
    LengthLt,
    LengthGte,
    LengthLte,
}

/// Operator of a single condition: operand type plus operation.
///
/// Example: `{ "type": "string", "operation": "startsWith" }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConditionOperator {
    /// Operand type
    #[serde(rename = "type")]
    pub operand_type: OperandType,

    /// Operation to apply
    pub operation: ConditionOperation,
}

/// A single comparison in a condition group.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Optional identifier (used in error messages)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Value being tested
    pub left_value: MappingValue,

    /// Value compared against (omitted for unary operations like `exists`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_value: Option<MappingValue>,

    /// Operator
    pub operator: ConditionOperator,
}

/// How the conditions of a group are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    /// All conditions must pass
    #[default]
    And,
    /// At least one condition must pass
    Or,
}

/// Type validation mode for condition operands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TypeValidation {
    /// Operands must already have the operator type
    #[default]
    Strict,
    /// Operands are converted to the operator type when possible
    Loose,
}

/// Options shared by all conditions of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConditionOptions {
    /// Compare strings case-sensitively (default: true)
    #[serde(default = "default_true")]
    pub case_sensitive: bool,

    /// Type validation mode (default: strict)
    #[serde(default)]
    pub type_validation: TypeValidation,
}

impl Default for ConditionOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            type_validation: TypeValidation::Strict,
        }
    }
}

/// A list of conditions combined with AND or OR.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConditionGroup {
    /// Conditions evaluated in order
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Combinator (default: and)
    #[serde(default)]
    pub combinator: Combinator,

    /// Group options
    #[serde(default)]
    pub options: ConditionOptions,
}

fn default_true() -> bool {
    true
}

// ============================================================================
// If / Filter
// ============================================================================

/// Parameters of the If node.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "IfParameters")]
#[serde(rename_all = "camelCase")]
pub struct IfParameters {
    /// Condition group evaluated per item
    pub conditions: ConditionGroup,

    /// Ignore case in string comparisons (overrides the group option)
    #[serde(default)]
    pub ignore_case: bool,

    /// Convert operand types where possible (overrides the group option)
    #[serde(default)]
    pub loose_type_validation: bool,
}

/// Parameters of the Filter node.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "FilterParameters")]
#[serde(rename_all = "camelCase")]
pub struct FilterParameters {
    /// Condition group evaluated per item
    pub conditions: ConditionGroup,

    /// Ignore case in string comparisons
    #[serde(default)]
    pub ignore_case: bool,

    /// Convert operand types where possible
    #[serde(default)]
    pub loose_type_validation: bool,

    /// Emit discarded items on a second output
    #[serde(default)]
    pub always_output_discarded: bool,
}

// ============================================================================
// Switch
// ============================================================================

/// Parameters of the Switch node.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "SwitchParameters")]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum SwitchParameters {
    /// Route by ordered rules, one output per rule
    Rules(SwitchRulesConfig),
    /// Route by a computed output index
    Expression(SwitchExpressionConfig),
}

/// Rules mode configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwitchRulesConfig {
    /// Routing rules; rule N routes to output N
    #[serde(default)]
    pub rules: Vec<SwitchRule>,

    /// Routing options
    #[serde(default)]
    pub options: SwitchOptions,
}

/// A single routing rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwitchRule {
    /// Conditions an item must satisfy to take this output
    pub conditions: ConditionGroup,

    /// Output label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_key: Option<String>,
}

/// Switch routing options.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwitchOptions {
    /// Where items matching no rule go
    #[serde(default)]
    pub fallback_output: FallbackOutput,

    /// Send items to every matching output instead of the first
    #[serde(default)]
    pub all_matching_outputs: bool,

    /// Ignore case in string comparisons
    #[serde(default)]
    pub ignore_case: bool,

    /// Convert operand types where possible
    #[serde(default)]
    pub loose_type_validation: bool,

    /// Label for the extra fallback output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename_fallback_output: Option<String>,
}

/// Destination of items that match no rule.
///
/// Serialized as `"none"`, `"extra"` or `{ "output": 2 }`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum FallbackOutput {
    /// Drop the item
    #[default]
    None,
    /// Route to an additional output after the rule outputs
    Extra,
    /// Route to a rule output by index
    Output(usize),
}

/// Expression mode configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwitchExpressionConfig {
    /// Number of outputs
    pub number_outputs: usize,

    /// Output index computed per item
    pub output: MappingValue,
}

// ============================================================================
// Set (Edit Fields)
// ============================================================================

/// Parameters of the Set node.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "SetParameters")]
#[serde(rename_all = "camelCase")]
pub struct SetParameters {
    /// How new fields are provided
    #[serde(flatten)]
    pub mode: SetMode,

    /// Carry input fields into the output
    #[serde(default)]
    pub include_other_fields: bool,

    /// Which input fields to carry (when include_other_fields is set)
    #[serde(default)]
    pub include: IncludeFields,

    /// Additional options
    #[serde(default)]
    pub options: SetOptions,
}

/// Source of the fields written by the Set node.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum SetMode {
    /// Field-by-field assignments
    Manual {
        /// Assignments applied in order
        #[serde(default)]
        assignments: Vec<Assignment>,
    },
    /// A whole JSON object
    Raw {
        /// Object (or JSON text of an object) merged into the output
        #[serde(rename = "jsonOutput")]
        json_output: MappingValue,
    },
}

/// A single field assignment.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    /// Field name or dot path
    pub name: String,

    /// Declared type of the value
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Value to assign
    pub value: MappingValue,
}

/// Declared type of an assigned field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

/// Which input fields the Set node carries into its output.
///
/// Serialized as `"all"`, `"none"`, `{ "selected": "a, b" }` or `{ "except": ["a"] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum IncludeFields {
    /// Every input field
    #[default]
    All,
    /// No input field
    None,
    /// Only the listed fields
    Selected(FieldList),
    /// Every field except the listed ones
    Except(FieldList),
}

/// Set node options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetOptions {
    /// Treat dots in names as nesting (default: true)
    #[serde(default = "default_true")]
    pub dot_notation: bool,

    /// Keep unconvertible values as-is instead of failing
    #[serde(default)]
    pub ignore_conversion_errors: bool,
}

impl Default for SetOptions {
    fn default() -> Self {
        Self {
            dot_notation: true,
            ignore_conversion_errors: false,
        }
    }
}

// ============================================================================
// RemoveDuplicates
// ============================================================================

/// Parameters of the RemoveDuplicates node.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "RemoveDuplicatesParameters")]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum RemoveDuplicatesParameters {
    /// Drop duplicates within the current input
    RemoveDuplicateInputItems(InputDedupConfig),
    /// Drop items already seen in previous executions
    RemoveItemsRepeatedInPreviousExecutions(HistoryDedupConfig),
    /// Clear the persisted deduplication history
    ClearDeduplicationHistory(ClearHistoryConfig),
}

/// Configuration for deduplicating the current input.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InputDedupConfig {
    /// Which fields form the comparison key
    #[serde(default)]
    pub compare: CompareFields,

    /// Options
    #[serde(default)]
    pub options: InputDedupOptions,
}

/// Fields compared when looking for duplicates.
///
/// Serialized as `"allFields"`, `{ "allFieldsExcept": "id" }` or `{ "selectedFields": ["email"] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum CompareFields {
    /// The whole item
    #[default]
    AllFields,
    /// The whole item minus the listed fields
    AllFieldsExcept(FieldList),
    /// Only the listed fields
    SelectedFields(FieldList),
}

/// Options for deduplicating the current input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InputDedupOptions {
    /// Treat dots in field names literally
    #[serde(default)]
    pub disable_dot_notation: bool,

    /// Output only the compared fields (selectedFields only)
    #[serde(default)]
    pub remove_other_fields: bool,
}

/// Configuration for deduplicating against previous executions.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryDedupConfig {
    /// Which items are kept
    pub logic: DedupLogic,

    /// Value identifying each item
    pub dedupe_value: MappingValue,

    /// Options
    #[serde(default)]
    pub options: HistoryOptions,
}

/// Rule deciding which items count as already processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum DedupLogic {
    /// Keep items whose value was never seen before
    RemoveItemsWithAlreadySeenKeyValues,
    /// Keep items whose numeric value exceeds the highest stored one
    RemoveItemsUpToStoredIncrementalKey,
    /// Keep items whose date is later than the latest stored one
    RemoveItemsUpToStoredDate,
}

/// Who shares a deduplication history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DedupScope {
    /// History private to this node
    #[default]
    Node,
    /// History shared by every node of the workflow
    Workflow,
}

/// History options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryOptions {
    /// History scope (default: node)
    #[serde(default)]
    pub scope: DedupScope,

    /// Maximum number of remembered values (default: 10000)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_size: Option<usize>,
}

/// Configuration for clearing the deduplication history.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClearHistoryConfig {
    /// What to clear
    #[serde(default)]
    pub mode: ClearMode,

    /// Options
    #[serde(default)]
    pub options: ClearHistoryOptions,
}

/// Clear mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ClearMode {
    /// Delete the whole stored history of the scope
    #[default]
    CleanDatabase,
}

/// Options for clearing the history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClearHistoryOptions {
    /// History scope (default: node)
    #[serde(default)]
    pub scope: DedupScope,
}
