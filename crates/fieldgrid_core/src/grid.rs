//! Grid builder: assembles one page of the sparse post×field matrix.

use crate::constants::is_internal_key;
use crate::error::AppError;
use crate::host::MetaHost;
use crate::models::grid::{FieldColumn, GridPage, GridRow};
use crate::models::post::{PostStatus, PostTypeDescriptor, PostTypeFilter};
use crate::models::value::FieldValue;
use std::collections::BTreeMap;

/// Resolve a post-type filter to concrete type names.
///
/// `All` expands to every registered type that [`PostTypeDescriptor::included_in_all`];
/// a named type passes through even when it is not registered.
pub fn resolve_post_types(filter: &PostTypeFilter, registered: &[PostTypeDescriptor]) -> Vec<String> {
    match filter {
        PostTypeFilter::All => registered
            .iter()
            .filter(|descriptor| descriptor.included_in_all())
            .map(|descriptor| descriptor.name.clone())
            .collect(),
        PostTypeFilter::Type(name) => vec![name.clone()],
    }
}

fn total_pages(total_posts: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_posts.div_ceil(page_size)
}

/// Build one grid page.
///
/// # Arguments
/// - `host`: Content host to read from.
/// - `filter`: Post types to include.
/// - `page`: 1-based page number; `0` is treated as `1`.
/// - `page_size`: Posts per page.
///
/// # Returns
/// The page. No posts or no columns are valid, displayable results.
///
/// # Errors
/// Propagates host storage errors. Label lookups never fail the build.
pub fn build_grid<H: MetaHost + ?Sized>(
    host: &H,
    filter: &PostTypeFilter,
    page: usize,
    page_size: usize,
) -> Result<GridPage, AppError> {
    let page = page.max(1);
    let post_types = host.list_post_types()?;
    let types = resolve_post_types(filter, &post_types);
    let statuses = PostStatus::EDITABLE;

    let total_posts = host.count_posts(&types, &statuses)?;
    let offset = (page - 1).saturating_mul(page_size);
    let posts = host.fetch_posts(&types, &statuses, page_size, offset)?;

    let mut labels: BTreeMap<String, String> = BTreeMap::new();
    let mut rows = Vec::with_capacity(posts.len());
    for post in posts {
        let mut fields = BTreeMap::new();
        for (key, stored) in host.get_all_meta(post.id)? {
            if is_internal_key(&key) {
                continue;
            }
            if !labels.contains_key(&key) {
                let label = match host.resolve_field_label(&key, post.id) {
                    Ok(Some(label)) if !label.trim().is_empty() => label,
                    Ok(_) => key.clone(),
                    Err(err) => {
                        tracing::debug!(key = %key, "Field label lookup failed: {}", err);
                        key.clone()
                    }
                };
                labels.insert(key.clone(), label);
            }
            fields.insert(key, FieldValue::from(stored));
        }
        rows.push(GridRow { post, fields });
    }

    // BTreeMap iteration yields keys in lexicographic order.
    let columns = labels
        .into_iter()
        .map(|(key, label)| FieldColumn { key, label })
        .collect::<Vec<_>>();

    tracing::debug!(
        post_type = filter.as_query_value(),
        page,
        rows = rows.len(),
        columns = columns.len(),
        "Built grid page"
    );

    Ok(GridPage {
        post_type: filter.as_query_value().to_string(),
        page,
        page_size,
        total_posts,
        total_pages: total_pages(total_posts, page_size),
        post_types,
        columns,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::post::{PostId, PostSummary, SaveOutcome, StoredMeta};
    use crate::test_support::{seed_post, setup_temp_db};
    use crate::Database;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 100), 0);
        assert_eq!(total_pages(1, 100), 1);
        assert_eq!(total_pages(100, 100), 1);
        assert_eq!(total_pages(101, 100), 2);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn build_grid_collects_sorted_columns_and_skips_internal_keys() {
        let (db, _temp) = setup_temp_db();
        db.ensure_default_post_types().expect("types");
        let p1 = seed_post(
            &db,
            "P1",
            &[
                ("color", FieldValue::scalar("red")),
                ("_edit_lock", FieldValue::scalar("123:1")),
            ],
        );
        let p2 = seed_post(
            &db,
            "P2",
            &[
                ("color", FieldValue::scalar("blue")),
                ("tags", FieldValue::list(["x", "y"])),
                ("_thumbnail_id", FieldValue::scalar("9")),
                ("alpha", FieldValue::scalar("first")),
            ],
        );

        let grid = build_grid(&db, &PostTypeFilter::All, 1, 100).expect("grid");
        let keys: Vec<&str> = grid.columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["alpha", "color", "tags"]);
        assert!(grid
            .rows
            .iter()
            .all(|row| row.fields.keys().all(|k| !k.starts_with('_'))));
        assert_eq!(grid.value(p1.id, "color"), Some(&FieldValue::scalar("red")));
        assert_eq!(grid.value(p1.id, "tags"), None);
        assert_eq!(grid.value(p2.id, "tags"), Some(&FieldValue::list(["x", "y"])));
        assert_eq!(grid.total_posts, 2);
        assert_eq!(grid.total_pages, 1);
    }

    #[test]
    fn build_grid_pages_by_title_and_clamps_page_zero() {
        let (db, _temp) = setup_temp_db();
        db.ensure_default_post_types().expect("types");
        for title in ["c", "a", "b"] {
            seed_post(&db, title, &[("k", FieldValue::scalar(title))]);
        }

        let first = build_grid(&db, &PostTypeFilter::All, 0, 2).expect("page 0");
        assert_eq!(first.page, 1);
        assert_eq!(first.total_pages, 2);
        let titles: Vec<&str> = first.rows.iter().map(|r| r.post.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);

        let second = build_grid(&db, &PostTypeFilter::All, 2, 2).expect("page 2");
        assert_eq!(second.rows.len(), 1);
        assert_eq!(second.rows[0].post.title, "c");

        let beyond = build_grid(&db, &PostTypeFilter::All, 9, 2).expect("page 9");
        assert!(beyond.is_empty());
        assert!(beyond.columns.is_empty());
    }

    #[test]
    fn build_grid_with_no_posts_is_valid() {
        let (db, _temp) = setup_temp_db();
        let grid = build_grid(&db, &PostTypeFilter::Type("product".to_string()), 1, 100)
            .expect("grid");
        assert!(grid.is_empty());
        assert!(grid.columns.is_empty());
        assert_eq!(grid.total_pages, 0);
        assert_eq!(grid.post_type, "product");
    }

    #[test]
    fn resolve_post_types_respects_visibility_flags() {
        let registered = vec![
            PostTypeDescriptor {
                name: "post".to_string(),
                label: "Posts".to_string(),
                public: true,
                show_ui: true,
                builtin: true,
            },
            PostTypeDescriptor {
                name: "wp_block".to_string(),
                label: "Blocks".to_string(),
                public: false,
                show_ui: true,
                builtin: true,
            },
            PostTypeDescriptor {
                name: "event".to_string(),
                label: "Events".to_string(),
                public: false,
                show_ui: true,
                builtin: false,
            },
        ];
        assert_eq!(
            resolve_post_types(&PostTypeFilter::All, &registered),
            vec!["post".to_string(), "event".to_string()]
        );
        assert_eq!(
            resolve_post_types(&PostTypeFilter::Type("page".to_string()), &registered),
            vec!["page".to_string()]
        );
    }

    /// Host whose label registry always errors.
    struct FailingLabels(Database);

    impl MetaHost for FailingLabels {
        fn list_post_types(&self) -> Result<Vec<PostTypeDescriptor>, AppError> {
            self.0.list_post_types()
        }
        fn count_posts(&self, t: &[String], s: &[PostStatus]) -> Result<usize, AppError> {
            self.0.count_posts(t, s)
        }
        fn fetch_posts(
            &self,
            t: &[String],
            s: &[PostStatus],
            limit: usize,
            offset: usize,
        ) -> Result<Vec<PostSummary>, AppError> {
            self.0.fetch_posts(t, s, limit, offset)
        }
        fn get_all_meta(&self, id: PostId) -> Result<BTreeMap<String, StoredMeta>, AppError> {
            self.0.get_all_meta(id)
        }
        fn resolve_field_label(&self, _: &str, _: PostId) -> Result<Option<String>, AppError> {
            Err(AppError::StorageMessage("label registry offline".to_string()))
        }
        fn can_edit(&self, id: PostId) -> Result<bool, AppError> {
            self.0.can_edit(id)
        }
        fn save_field(
            &self,
            id: PostId,
            key: &str,
            value: &FieldValue,
        ) -> Result<SaveOutcome, AppError> {
            self.0.save_field(id, key, value)
        }
        fn delete_field(&self, id: PostId, key: &str) -> Result<bool, AppError> {
            self.0.delete_field(id, key)
        }
        fn delete_field_everywhere(&self, key: &str) -> Result<usize, AppError> {
            self.0.delete_field_everywhere(key)
        }
    }

    #[test]
    fn label_failures_fall_back_to_key() {
        let (db, _temp) = setup_temp_db();
        db.ensure_default_post_types().expect("types");
        db.meta.set_label("color", "Colour").expect("label");
        seed_post(&db, "P", &[("color", FieldValue::scalar("red"))]);

        let labelled = build_grid(&db, &PostTypeFilter::All, 1, 10).expect("grid");
        assert_eq!(labelled.columns[0].label, "Colour");

        let host = FailingLabels(db);
        let fallback = build_grid(&host, &PostTypeFilter::All, 1, 10).expect("grid");
        assert_eq!(fallback.columns[0].label, "color");
    }
}
