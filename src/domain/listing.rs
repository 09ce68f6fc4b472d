use crate::shared::{ParsedPagination, SortOrder};

/// A resolved list request handed to a repository.
///
/// `sort` is already a resource-specific column enum, so repositories never
/// see caller-supplied identifiers.
#[derive(Debug, Clone)]
pub struct ListQuery<F, S> {
    pub filter: F,
    pub sort: S,
    pub order: SortOrder,
    pub offset: u64,
    pub limit: u64,
}

impl<F, S: Copy> ListQuery<F, S> {
    /// Resolves `pagination.sort` through `allowed`, falling back to `default_sort`.
    pub fn from_pagination(
        filter: F,
        pagination: &ParsedPagination,
        allowed: &[(&str, S)],
        default_sort: S,
    ) -> Self {
        Self {
            filter,
            sort: pagination.sort_column(allowed, default_sort),
            order: pagination.order,
            offset: pagination.offset,
            limit: pagination.limit,
        }
    }
}
