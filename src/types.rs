/// Brand identifier as delivered by the record source.
/// Example: `Q7Z2K`
pub type BrandId = String;
/// Store identifier as delivered by the record source.
/// Example: `A0B9X`
pub type StoreId = String;
/// Dense company identifier (already bounded by the source).
/// Examples: `0`, `4`
pub type CompanyId = u32;
/// Dense product identifier (already bounded by the source).
/// Examples: `0`, `49`
pub type ProductId = u32;
/// Dense index assigned by a code book in first-seen order.
/// Examples: `0`, `1`, `2`
pub type CodeIndex = usize;
/// Identifier for the source that produced a record, used in logs and errors.
/// Examples: `synthetic`, `sales.jsonl`
pub type SourceId = String;
