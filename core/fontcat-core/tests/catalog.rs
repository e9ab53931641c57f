mod common;

use std::fs;

use common::{Fixture, StubIntrospector};
use fontcat_core::config::{
    CHARACTERISTICS_FILE, DATABASE_FILE, DELTA_DATABASE_FILE, DELTA_FEATURES_FILE,
    FEATURES_BIS_FILE, FEATURES_FILE,
};
use fontcat_core::{FontKey, Location, PathExpr, Value};

#[test]
fn first_load_migrates_and_remaps_resized_fonts() {
    let fx = Fixture::new();
    fx.write_global(
        DATABASE_FILE,
        "((\"Foo\" \"Regular\") ((\"foo.ttf\" \"0\" \"1000\")))\n\
         ((\"Gone\" \"Regular\") ((\"gone.ttf\" \"0\" \"10\")))\n",
    );
    fx.font("foo.ttf", 1200);

    let mut catalog = fx.catalog(StubIntrospector::default());
    assert_eq!(catalog.families(), vec!["Foo"]);
    assert_eq!(
        catalog.fonts().get(&FontKey::new("Foo", "Regular")),
        Some(&vec![Location::new("foo.ttf", 0, 1200)])
    );
    assert_eq!(
        fx.read_local(DATABASE_FILE),
        "((\"Foo\" \"Regular\") ((\"foo.ttf\" \"0\" \"1200\")))\n"
    );
    assert!(fx.saves.get() > 0);
}

#[test]
fn first_load_adds_user_fonts_with_one_signal_per_save() {
    let fx = Fixture::new();
    let digest = "fedcba9876543210fedcba9876543210.ttf";
    fs::write(fx.user_dir().join(digest), b"abcd").expect("write");

    let introspector = StubIntrospector::default().with(digest, &[("Private", "Regular")]);
    let mut catalog = fx.catalog(introspector);
    assert_eq!(catalog.families(), vec!["Private"]);

    // three migration saves, then fonts, features and characteristics once more
    assert_eq!(fx.saves.get(), 6);
    assert!(fx.read_local(DATABASE_FILE).contains(digest));
}

#[test]
fn local_catalog_overrides_global_and_loads_once() {
    let fx = Fixture::new();
    fx.write_global(DATABASE_FILE, "((\"Global\" \"Regular\") ((\"g.ttf\" \"0\" \"1\")))\n");
    fx.write_local(DATABASE_FILE, "((\"Local\" \"Regular\") ((\"l.ttf\" \"0\" \"1\")))\n");

    let mut catalog = fx.catalog(StubIntrospector::default());
    assert_eq!(catalog.families(), vec!["Local"]);

    fx.write_local(DATABASE_FILE, "((\"Changed\" \"Regular\") ((\"c.ttf\" \"0\" \"1\")))\n");
    assert_eq!(catalog.families(), vec!["Local"]);

    catalog.reset();
    assert_eq!(catalog.families(), vec!["Changed"]);
}

#[test]
fn build_local_skips_blacklisted_files() {
    let fx = Fixture::new();
    fx.font("foo.ttf", 10);
    fx.font("blex.ttf", 10);
    fx.font("broken.otf", 10);

    let introspector = StubIntrospector::default()
        .with("foo.ttf", &[("Foo Sans", "Regular")])
        .with("blex.ttf", &[("Blex", "Regular")]);
    let mut catalog = fx.catalog(introspector);
    let summary = catalog.build_local().expect("build");

    assert_eq!(summary.faces, 1);
    assert_eq!(summary.skipped, 2);
    let database = fx.read_local(DATABASE_FILE);
    assert!(database.contains("foo.ttf"));
    assert!(!database.contains("blex"));
    assert!(!catalog.exists("blex"));
    assert_eq!(catalog.suffixes("foo"), vec!["ttf"]);

    // Family guessed from its name, keyed by family alone.
    assert_eq!(
        catalog.features(&Value::atom("Foo Sans")),
        vec![Value::atom("sansserif")]
    );
    assert!(fx.read_local(FEATURES_FILE).contains("(\"Foo Sans\" \"sansserif\")"));
}

#[test]
fn families_sort_case_insensitively() {
    let fx = Fixture::new();
    fx.write_local(
        DATABASE_FILE,
        "((\"Zeta\" \"Bold\") ((\"z.ttf\" \"0\" \"1\")))\n\
         ((\"alpha\" \"Regular\") ((\"a.ttf\" \"0\" \"1\")))\n",
    );

    let mut catalog = fx.catalog(StubIntrospector::default());
    assert_eq!(catalog.families(), vec!["alpha", "Zeta"]);
    assert_eq!(catalog.styles("Zeta"), vec!["Bold"]);
    assert!(catalog.styles("zeta").is_empty());
}

#[test]
fn search_expands_collection_members() {
    let fx = Fixture::new();
    fx.write_local(
        DATABASE_FILE,
        "((\"Songti\" \"Bold\") ((\"Songti.ttc\" \"3\" \"500\") (\"Songti.ttc\" \"3\")))\n\
         ((\"Foo\" \"Regular\") ((\"Foo.otf\" \"0\" \"9\")))\n",
    );

    let mut catalog = fx.catalog(StubIntrospector::default());
    assert_eq!(catalog.search("Songti", "Bold"), vec!["Songti.3.ttf"]);
    assert_eq!(catalog.search("Foo", "Regular"), vec!["Foo.otf"]);
    assert!(catalog.search("Foo", "Bold").is_empty());
}

#[test]
fn extended_fonts_survive_filtering() {
    let fx = Fixture::new();
    let outside = fx.root.path().join("download");
    fs::create_dir_all(&outside).expect("mkdir");
    let digest = "0123456789abcdef0123456789abcdef.ttf";
    fs::write(outside.join(digest), b"abcd").expect("write");
    fs::write(outside.join("notes.ttf"), b"abcd").expect("write");

    let introspector = StubIntrospector::default()
        .with(digest, &[("Downloaded", "Regular")])
        .with("notes.ttf", &[("Notes", "Regular")]);
    let mut catalog = fx.catalog(introspector);

    assert_eq!(catalog.extend_local(&outside).expect("extend"), 1);
    catalog.filter();
    assert_eq!(catalog.families(), vec!["Downloaded"]);
    assert!(fx.read_local(DATABASE_FILE).contains(digest));
}

#[test]
fn substitutions_need_a_known_target() {
    let fx = Fixture::new();
    fx.write_local(DATABASE_FILE, "((\"Arimo\" \"Regular\") ((\"arimo.ttf\" \"0\" \"1\")))\n");
    fx.write_global(
        "font-substitutions.scm",
        "((\"Helvetica\") (\"Arimo\"))\n((\"Times\") (\"Tinos\"))\n",
    );

    let mut catalog = fx.catalog(StubIntrospector::default());
    assert_eq!(catalog.substitutions("Helvetica").len(), 1);
    assert!(catalog.substitutions("Times").is_empty());
    assert!(catalog.characteristics("Arimo", "Regular").is_empty());
}

#[test]
fn delta_keeps_new_and_changed_entries() {
    let fx = Fixture::new();
    fx.write_global(
        DATABASE_FILE,
        "((\"Same\" \"Regular\") ((\"s.ttf\" \"0\" \"1\")))\n\
         ((\"Changed\" \"Regular\") ((\"c.ttf\" \"0\" \"1\")))\n",
    );
    fx.write_global(FEATURES_FILE, "(\"Same\" \"serif\")\n");
    fx.write_local(
        DATABASE_FILE,
        "((\"Same\" \"Regular\") ((\"s.ttf\" \"0\" \"1\")))\n\
         ((\"Changed\" \"Regular\") ((\"c.ttf\" \"0\" \"2\")))\n\
         ((\"Fresh\" \"Regular\") ((\"f.ttf\" \"0\" \"1\")))\n",
    );
    fx.write_local(FEATURES_FILE, "(\"Same\" \"serif\")\n(\"Fresh\" \"mono\")\n");

    let mut catalog = fx.catalog(StubIntrospector::default());
    let summary = catalog.save_local_delta().expect("delta");

    assert_eq!(summary.fonts, 2);
    assert_eq!(summary.features, 1);
    assert_eq!(summary.characteristics, 0);
    assert_eq!(catalog.delta_families(), vec!["Changed", "Fresh"]);
    assert_eq!(fx.read_local(DELTA_FEATURES_FILE), "(\"Fresh\" \"mono\")\n");
    assert!(!fx.read_local(DELTA_DATABASE_FILE).contains("Same"));
    assert!(!catalog.is_loaded());
}

#[test]
fn build_global_writes_the_reference_files() {
    let fx = Fixture::new();
    fx.write_global(DATABASE_FILE, "((\"Old\" \"Regular\") ((\"old.ttf\" \"0\" \"1\")))\n");
    let extra = fx.font("new.otf", 5);

    let introspector = StubIntrospector::default().with("new.otf", &[("New Mono", "Regular")]);
    let mut catalog = fx.catalog(introspector);
    catalog
        .build_global(Some(PathExpr::File(extra)))
        .expect("build global");

    let database = fx.read_global(DATABASE_FILE);
    assert!(database.contains("old.ttf"));
    assert!(database.contains("(\"new.otf\" \"0\" \"5\")"));
    assert!(fx.read_global(FEATURES_BIS_FILE).contains("\"New Mono\""));
    assert!(!catalog.is_loaded());
    assert!(catalog.fonts().is_empty());
}

#[test]
fn global_styles_come_from_the_reference() {
    let fx = Fixture::new();
    fx.write_global(
        DATABASE_FILE,
        "((\"Foo\" \"Regular\") ((\"foo.ttf\" \"0\" \"1\")))\n\
         ((\"Foo\" \"Bold\") ((\"foob.ttf\" \"0\" \"1\")))\n",
    );
    fx.write_local(DATABASE_FILE, "((\"Bar\" \"Regular\") ((\"bar.ttf\" \"0\" \"1\")))\n");

    let mut catalog = fx.catalog(StubIntrospector::default());
    assert!(catalog.styles("Foo").is_empty());
    assert_eq!(catalog.global_styles("Foo"), vec!["Bold", "Regular"]);
}

#[test]
fn global_reference_stays_out_of_the_local_catalog() {
    let fx = Fixture::new();
    fx.write_global(DATABASE_FILE, "((\"Gone\" \"Regular\") ((\"gone.ttf\" \"0\" \"1\")))\n");
    fx.write_global(FEATURES_FILE, "(\"Gone\" \"serif\")\n");
    fx.write_global(CHARACTERISTICS_FILE, "((\"Gone\" \"Regular\") (\"weight=400\"))\n");
    fx.write_local(DATABASE_FILE, "((\"Bar\" \"Regular\") ((\"bar.ttf\" \"0\" \"1\")))\n");
    fx.write_local(FEATURES_FILE, "(\"Bar\" \"sansserif\")\n");
    fx.write_local(CHARACTERISTICS_FILE, "((\"Bar\" \"Regular\") (\"weight=700\"))\n");

    let mut catalog = fx.catalog(StubIntrospector::default());
    assert_eq!(catalog.global_styles("Gone"), vec!["Regular"]);
    assert_eq!(catalog.global_characteristics("Gone", "Regular"), vec!["weight=400"]);
    assert_eq!(catalog.global_features(&Value::atom("Gone")), vec![Value::atom("serif")]);

    assert_eq!(catalog.families(), vec!["Bar"]);
    assert!(catalog.characteristics("Gone", "Regular").is_empty());
    assert!(catalog.features(&Value::atom("Gone")).is_empty());

    catalog.save().expect("save");
    assert!(!fx.read_local(CHARACTERISTICS_FILE).contains("Gone"));
    assert!(!fx.read_local(FEATURES_FILE).contains("Gone"));
    assert!(!fx.read_local(DATABASE_FILE).contains("Gone"));
}

#[test]
fn cold_suffix_queries_read_both_databases() {
    let fx = Fixture::new();
    fx.write_local(DATABASE_FILE, "((\"Foo\" \"Regular\") ((\"Foo.ttf\" \"0\" \"1\")))\n");
    fx.write_global(DATABASE_FILE, "((\"Foo\" \"Regular\") ((\"Foo.otf\" \"0\" \"1\")))\n");

    let mut catalog = fx.catalog(StubIntrospector::default());
    assert!(catalog.exists("Foo"));
    assert_eq!(catalog.suffixes("Foo"), vec!["ttf", "otf"]);
    assert!(catalog.suffixes("Bar").is_empty());
}
