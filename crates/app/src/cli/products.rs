use std::io;

use clap::{Args, ValueEnum};
use storefront::catalog::{CatalogQuery, Categories, PriceSort};
use storefront_app::{context::AppContext, render};
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum SortOption {
    #[default]
    Relevant,
    LowHigh,
    HighLow,
}

impl From<SortOption> for PriceSort {
    fn from(option: SortOption) -> Self {
        match option {
            SortOption::Relevant => Self::Relevant,
            SortOption::LowHigh => Self::LowToHigh,
            SortOption::HighLow => Self::HighToLow,
        }
    }
}

#[derive(Debug, Args)]
pub(crate) struct ProductsArgs {
    /// Only products whose name contains this text
    #[arg(long)]
    search: Option<String>,

    /// Category name or id to include; repeat for several
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Sub-category to include; repeat for several
    #[arg(long = "sub-category")]
    sub_categories: Vec<String>,

    /// Result ordering (relevant, low-high, high-low)
    #[arg(long, value_enum, default_value_t = SortOption::Relevant)]
    sort: SortOption,
}

pub(crate) async fn run(context: &AppContext, args: ProductsArgs) -> Result<(), String> {
    let catalog = context
        .catalog()
        .await
        .map_err(|error| format!("failed to load products: {error}"))?;

    let categories = context.categories().await.unwrap_or_else(|error| {
        warn!("categories unavailable, showing ids: {error}");
        Categories::default()
    });

    let query = CatalogQuery {
        categories: resolve_categories(&categories, &args.categories)?,
        sub_categories: args.sub_categories,
        search: args.search,
        sort: args.sort.into(),
    };

    render::write_products(
        io::stdout().lock(),
        &catalog.query(&query),
        &categories,
        context.currency,
    )
    .map_err(|error| format!("failed to print products: {error}"))
}

/// Map each `--category` value to an id, accepting names or numeric ids.
fn resolve_categories(categories: &Categories, selected: &[String]) -> Result<Vec<u64>, String> {
    selected
        .iter()
        .map(|value| {
            value
                .trim()
                .parse()
                .ok()
                .or_else(|| categories.id_of(value))
                .ok_or_else(|| format!("unknown category: {value}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use storefront::catalog::Category;

    use super::*;

    #[test]
    fn categories_resolve_by_name_or_id() {
        let categories = Categories::new([Category {
            id: 2,
            name: "Women".to_string(),
        }]);
        let selected = ["women".to_string(), "5".to_string()];

        assert_eq!(resolve_categories(&categories, &selected), Ok(vec![2, 5]));
        assert_eq!(
            resolve_categories(&categories, &["Kids".to_string()]),
            Err("unknown category: Kids".to_string())
        );
    }
}
