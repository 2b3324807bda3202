use crate::domain::brand::Brand;
use crate::domain::types::BrandName;
use crate::repository::BrandWriter;

use super::{ServiceError, ServiceResult};

/// An edit distance at or above this value is no longer considered a match
/// (up to 3 edits are tolerated).
pub const BRAND_MATCH_THRESHOLD: usize = 4;

/// Picks the known canonical brand closest to an imported free-text value.
///
/// Distances are computed over lower-cased strings. Returns `None` when no
/// candidate is strictly under [`BRAND_MATCH_THRESHOLD`]; the caller then
/// uses the literal input and the resolver creates the brand. Ties on the
/// minimal distance go to the lexicographically smallest canonical name so
/// repeated imports resolve identically.
pub fn match_brand_name<'a>(input: &str, known: &'a [Brand]) -> Option<&'a Brand> {
    let needle = input.trim().to_lowercase();

    let mut best: Option<(usize, String, &Brand)> = None;
    for brand in known {
        let candidate = brand.name.as_str().to_lowercase();
        let distance = strsim::levenshtein(&needle, &candidate);

        let better = match &best {
            None => true,
            Some((best_distance, best_candidate, _)) => {
                distance < *best_distance
                    || (distance == *best_distance && candidate < *best_candidate)
            }
        };

        if better {
            best = Some((distance, candidate, brand));
        }
    }

    best.filter(|(distance, _, _)| *distance < BRAND_MATCH_THRESHOLD)
        .map(|(_, _, brand)| brand)
}

/// Resolves a brand name to its stored record, creating it when unseen.
pub fn resolve_brand<R>(name: &BrandName, repo: &R) -> ServiceResult<Brand>
where
    R: BrandWriter,
{
    match repo.get_or_create_brand(name) {
        Ok(brand) => Ok(brand),
        Err(e) => {
            log::error!("Failed to resolve brand '{name}': {e}");
            Err(ServiceError::Internal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::BrandId;
    use crate::repository::test::TestRepository;

    fn brand(id: i32, name: &str) -> Brand {
        Brand {
            id: BrandId::new(id).unwrap(),
            name: BrandName::new(name).unwrap(),
        }
    }

    #[test]
    fn close_input_matches_canonical_brand() {
        let known = vec![brand(1, "Apple"), brand(2, "Samsung")];
        let matched = match_brand_name("aple", &known).unwrap();
        assert_eq!(matched.name, "Apple");
    }

    #[test]
    fn distant_input_matches_nothing() {
        let known = vec![brand(1, "Apple"), brand(2, "Samsung")];
        assert!(match_brand_name("zzz", &known).is_none());
    }

    #[test]
    fn empty_candidate_set_matches_nothing() {
        assert!(match_brand_name("Apple", &[]).is_none());
    }

    #[test]
    fn ties_resolve_to_lexicographically_smallest_name() {
        // "Moto" is one edit from both candidates.
        let known = vec![brand(1, "Motz"), brand(2, "Mota")];
        let matched = match_brand_name("Moto", &known).unwrap();
        assert_eq!(matched.name, "Mota");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let known = vec![brand(1, "Xiaomi")];
        let matched = match_brand_name("XIAOMI", &known).unwrap();
        assert_eq!(matched.name, "Xiaomi");
    }

    #[test]
    fn resolve_creates_unseen_brand() {
        let repo = TestRepository::default();
        let name = BrandName::new("Nokia").unwrap();

        let first = resolve_brand(&name, &repo).unwrap();
        let second = resolve_brand(&BrandName::new("nokia").unwrap(), &repo).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repo.brand_names(), vec!["Nokia".to_string()]);
    }
}
