use super::EntityMetadata;

/// Root of an aggregate
///
/// Instance accessors plus static naming used for table names and log lines.
pub trait AggregateRoot {
    type Id;

    fn id(&self) -> Self::Id;

    /// Business code of the record (e.g. "PRD-20L")
    fn code(&self) -> &str;

    fn description(&self) -> &str;

    fn metadata(&self) -> &EntityMetadata;

    fn metadata_mut(&mut self) -> &mut EntityMetadata;

    /// Aggregate index, e.g. "a001"
    fn aggregate_index() -> &'static str;

    /// Collection name, e.g. "product"
    fn collection_name() -> &'static str;

    /// Singular display name, e.g. "Product"
    fn element_name() -> &'static str;

    /// Plural display name, e.g. "Products"
    fn list_name() -> &'static str;

    /// Full system name, e.g. "a001_product"
    fn full_name() -> String {
        format!("{}_{}", Self::aggregate_index(), Self::collection_name())
    }
}
