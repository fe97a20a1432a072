//! Name transforms shared by route, action and page derivation.
//!
//! Paths built from these are used as map keys, so every function here must
//! return the same output for the same input.

/// Suffixes stripped by [`base_name`], checked in this order.
pub const VIEW_SUFFIXES: [&str; 6] = ["Form", "List", "Grid", "Detail", "View", "Card"];

/// `ProductForm` -> `product-form`, `Order  history` -> `order-history`.
///
/// A hyphen goes in before an uppercase letter that follows a lowercase letter
/// or digit, and for every run of other characters. Only ASCII letters and
/// digits survive, so the result is always a single safe path segment.
pub fn kebab(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    let mut in_gap = false;

    for ch in name.chars() {
        if !ch.is_ascii_alphanumeric() {
            in_gap = true;
            continue;
        }
        if in_gap {
            if !out.is_empty() {
                out.push('-');
            }
            in_gap = false;
        } else if let Some(p) = prev {
            if (p.is_ascii_lowercase() || p.is_ascii_digit()) && ch.is_ascii_uppercase() {
                out.push('-');
            }
        }
        out.push(ch.to_ascii_lowercase());
        prev = Some(ch);
    }

    out
}

/// Strip one trailing view-role suffix (`ProductForm` -> `Product`).
/// A name that is nothing but a suffix is returned unchanged.
pub fn base_name(name: &str) -> &str {
    for suffix in VIEW_SUFFIXES {
        if let Some(base) = name.strip_suffix(suffix) {
            if !base.is_empty() {
                return base;
            }
        }
    }
    name
}

/// `order history` / `order-history` / `orderHistory` -> `OrderHistory`.
pub fn pascal(name: &str) -> String {
    name.split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Naive English plural used for list action names (`Product` -> `Products`).
pub fn plural(word: &str) -> String {
    if word.ends_with('s') {
        word.to_string()
    } else if let Some(stem) = word.strip_suffix('y') {
        if stem.ends_with(|c: char| "aeiou".contains(c)) {
            format!("{word}s")
        } else {
            format!("{stem}ies")
        }
    } else {
        format!("{word}s")
    }
}

/// `products` -> `product`. Only a single trailing `s` is dropped.
pub fn singular(word: &str) -> &str {
    if word.len() > 1 && word.ends_with('s') && !word.ends_with("ss") {
        &word[..word.len() - 1]
    } else {
        word
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kebab_splits_case_boundaries_and_whitespace() {
        assert_eq!(kebab("ProductForm"), "product-form");
        assert_eq!(kebab("Dashboard"), "dashboard");
        assert_eq!(kebab("order   history"), "order-history");
        assert_eq!(kebab("User Profile Card"), "user-profile-card");
        assert_eq!(kebab("HTMLView"), "htmlview");
        assert_eq!(kebab("Step2Form"), "step2-form");
        assert_eq!(kebab("order_history"), "order-history");
    }

    #[test]
    fn kebab_drops_path_syntax() {
        assert_eq!(kebab("../../../x"), "x");
        assert_eq!(kebab("a/b\\c"), "a-b-c");
        assert_eq!(kebab(".."), "");
    }

    #[test]
    fn kebab_is_stable() {
        let once = kebab("ItemDetailView");
        assert_eq!(once, "item-detail-view");
        assert_eq!(kebab("ItemDetailView"), once);
    }

    #[test]
    fn base_name_strips_one_suffix() {
        assert_eq!(base_name("ProductForm"), "Product");
        assert_eq!(base_name("OrderList"), "Order");
        assert_eq!(base_name("ItemDetailView"), "ItemDetail");
        assert_eq!(base_name("Dashboard"), "Dashboard");
        assert_eq!(base_name("Form"), "Form");
    }

    #[test]
    fn pascal_joins_words() {
        assert_eq!(pascal("order history"), "OrderHistory");
        assert_eq!(pascal("order-history"), "OrderHistory");
        assert_eq!(pascal("orderHistory"), "OrderHistory");
        assert_eq!(pascal("Product Form"), "ProductForm");
    }

    #[test]
    fn plural_and_singular() {
        assert_eq!(plural("Product"), "Products");
        assert_eq!(plural("Category"), "Categories");
        assert_eq!(plural("Day"), "Days");
        assert_eq!(singular("products"), "product");
        assert_eq!(singular("address"), "address");
    }
}
