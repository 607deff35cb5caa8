use mailsort_core::categorizer::{self, predicate_fn, CustomRule};
use mailsort_core::models::{KeywordRule, Method, PatternRule};
use mailsort_core::{CategoryMap, Error};

fn emails(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn flatten(map: &CategoryMap) -> Vec<String> {
    let mut all: Vec<String> = map.iter().flat_map(|(_, e)| e.to_vec()).collect();
    all.sort();
    all
}

fn sorted(mut v: Vec<String>) -> Vec<String> {
    v.sort();
    v
}

fn sample() -> Vec<String> {
    emails(&[
        "user@gmail.com",
        "admin@company.com",
        "student@university.edu",
        "support@yahoo.com",
        "info@business.org",
        "contact@gov.uk",
        "clerk@agency.gov",
        "pupil@school.ac.uk",
    ])
}

#[test]
fn by_domain_groups_in_first_seen_order() {
    let input = emails(&["a@x.com", "b@y.com", "c@X.com", "nodomain", "d@"]);
    let map = categorizer::by_domain(&input);
    assert_eq!(map.labels().collect::<Vec<_>>(), vec!["x.com", "y.com"]);
    assert_eq!(map.get("x.com").unwrap(), &["a@x.com", "c@X.com"]);
    assert_eq!(map.total(), 3);
}

#[test]
fn by_type_assigns_every_address_once() {
    let input = sample();
    let map = categorizer::by_type(&input);
    assert_eq!(
        map.labels().collect::<Vec<_>>(),
        vec!["free", "business", "educational", "government", "other"]
    );
    assert_eq!(flatten(&map), sorted(input));
    assert_eq!(map.get("free").unwrap(), &["user@gmail.com", "support@yahoo.com"]);
    assert_eq!(
        map.get("educational").unwrap(),
        &["student@university.edu", "pupil@school.ac.uk"]
    );
    assert_eq!(
        map.get("government").unwrap(),
        &["contact@gov.uk", "clerk@agency.gov"]
    );
    assert_eq!(
        map.get("business").unwrap(),
        &["admin@company.com", "info@business.org"]
    );
}

#[test]
fn educational_beats_business_heuristic() {
    let map = categorizer::by_type(&emails(&["student@school.ac.uk"]));
    assert_eq!(map.get("educational").unwrap(), &["student@school.ac.uk"]);
    assert!(map.get("business").unwrap().is_empty());
}

#[test]
fn educational_suffix_needs_a_label_boundary() {
    let map = categorizer::by_type(&emails(&["a@lilac.uk", "b@frac.in", "c@cs.ac.in"]));
    assert_eq!(map.get("educational").unwrap(), &["c@cs.ac.in"]);
    assert_eq!(map.get("business").unwrap(), &["a@lilac.uk", "b@frac.in"]);
}

#[test]
fn dotless_or_missing_domains_fall_to_other() {
    let map = categorizer::by_type(&emails(&["root@localhost", "nobody"]));
    assert_eq!(map.get("other").unwrap(), &["root@localhost", "nobody"]);
}

#[test]
fn keywords_first_match_wins() {
    let input = emails(&["sales@co.com", "support@co.com", "random@co.com"]);
    let rules = vec![
        KeywordRule::new("sales", &["sales"]),
        KeywordRule::new("support", &["support", "help"]),
    ];
    let map = categorizer::by_keywords(&input, &rules);

    let expected: CategoryMap = vec![
        ("sales".to_string(), emails(&["sales@co.com"])),
        ("support".to_string(), emails(&["support@co.com"])),
        ("uncategorized".to_string(), emails(&["random@co.com"])),
    ]
    .into_iter()
    .collect();
    assert_eq!(map, expected);
}

#[test]
fn keyword_order_decides_overlaps() {
    let input = emails(&["SalesHelp@co.com"]);
    let rules = vec![
        KeywordRule::new("support", &["nothing", "HELP"]),
        KeywordRule::new("sales", &["sales"]),
    ];
    let map = categorizer::by_keywords(&input, &rules);
    assert_eq!(map.get("support").unwrap(), &["SalesHelp@co.com"]);
    assert!(!map.contains("sales"));
}

#[test]
fn patterns_anchor_at_start_only() {
    let input = emails(&["user123@example.com", "admin@example.com", "test@example.com", "superadmin@example.com"]);
    let rules = vec![
        PatternRule::new("numeric", r".*\d+.*@.*"),
        PatternRule::new("admin", r"admin"),
    ];
    let map = categorizer::by_pattern(&input, &rules).unwrap();
    assert_eq!(map.get("numeric").unwrap(), &["user123@example.com"]);
    assert_eq!(map.get("admin").unwrap(), &["admin@example.com"]);
    assert_eq!(
        map.get("uncategorized").unwrap(),
        &["test@example.com", "superadmin@example.com"]
    );
}

#[test]
fn invalid_pattern_is_rejected() {
    let err = categorizer::by_pattern(&emails(&["a@b.com"]), &[PatternRule::new("bad", "(")])
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn custom_rule_failures_fall_through_to_next_rule() {
    let input = emails(&["vip@corp.com", "ops@corp.com", "guest@home.net"]);
    let rules = vec![
        CustomRule::new("broken", |email: &str| -> anyhow::Result<bool> {
            if email.starts_with("vip") {
                anyhow::bail!("lookup service unavailable")
            }
            Ok(false)
        }),
        CustomRule::new("corp", predicate_fn(|email: &str| email.ends_with("@corp.com"))),
    ];
    let map = categorizer::by_custom_rule(&input, &rules);
    assert_eq!(map.get("corp").unwrap(), &["vip@corp.com", "ops@corp.com"]);
    assert_eq!(map.get("uncategorized").unwrap(), &["guest@home.net"]);
    assert!(!map.contains("broken"));
}

#[test]
fn statistics_follow_map_order() {
    let map = categorizer::by_type(&sample());
    let stats = categorizer::statistics(&map);
    let counts: Vec<(&str, usize)> = stats.iter().collect();
    assert_eq!(
        counts,
        vec![
            ("free", 2),
            ("business", 2),
            ("educational", 2),
            ("government", 2),
            ("other", 0)
        ]
    );
}

#[test]
fn filter_uses_requested_order_and_exclude_uses_map_order() {
    let map = categorizer::by_type(&sample());
    let kept = categorizer::filter_by_category(&map, &["government", "free", "missing"]);
    assert_eq!(
        kept,
        emails(&["contact@gov.uk", "clerk@agency.gov", "user@gmail.com", "support@yahoo.com"])
    );

    let rest = categorizer::exclude_categories(&map, &["free", "business", "government"]);
    assert_eq!(rest, emails(&["student@university.edu", "pupil@school.ac.uk"]));
}

#[test]
fn multi_runs_only_option_free_methods() {
    let results = categorizer::categorize_multi(
        &emails(&["a@gmail.com"]),
        &[Method::Type, Method::Keywords, Method::Domain],
    );
    let methods: Vec<Method> = results.iter().map(|(m, _)| *m).collect();
    assert_eq!(methods, vec![Method::Type, Method::Domain]);
    assert_eq!(results[1].1.get("gmail.com").unwrap(), &["a@gmail.com"]);
}
