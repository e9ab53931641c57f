use std::fs;

use fontcat_core::store::{load_characteristics, load_fonts, save_characteristics, save_fonts};
use fontcat_core::table::{CharacteristicsTable, FontTable};
use fontcat_core::{FontKey, Location};
use proptest::prelude::*;
use tempfile::tempdir;

fn label() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Foo".to_string()),
        Just("foo".to_string()),
        Just("FOO".to_string()),
        "[A-Za-z][A-Za-z \"\\\\]{0,8}",
    ]
}

fn location() -> impl Strategy<Value = Location> {
    (label(), 0u32..4, proptest::option::of(0u64..5000)).prop_map(|(stem, index, size)| {
        let file = format!("{stem}.ttf");
        match size {
            Some(size) => Location::new(file, index, size),
            None => Location::without_size(file, index),
        }
    })
}

fn font_table() -> impl Strategy<Value = FontTable> {
    proptest::collection::vec((label(), label(), proptest::collection::vec(location(), 0..4)), 0..12)
        .prop_map(|entries| {
            let mut fonts = FontTable::new();
            for (family, style, locations) in entries {
                let key = FontKey::new(family, style);
                fonts.insert(key.clone(), Vec::new());
                for location in locations {
                    fonts.insert_unique(key.clone(), location);
                }
            }
            fonts
        })
}

proptest! {
    #[test]
    fn font_saves_are_a_fixed_point(fonts in font_table()) {
        let tmp = tempdir().expect("tempdir");
        let first = tmp.path().join("first.scm");
        let second = tmp.path().join("second.scm");

        save_fonts(&first, &fonts).expect("save");
        let mut reloaded = FontTable::new();
        load_fonts(&first, &mut reloaded);
        prop_assert_eq!(&reloaded, &fonts);

        save_fonts(&second, &reloaded).expect("save again");
        prop_assert_eq!(
            fs::read_to_string(&first).expect("read"),
            fs::read_to_string(&second).expect("read")
        );
    }

    #[test]
    fn characteristic_saves_are_a_fixed_point(
        entries in proptest::collection::vec((label(), label(), proptest::collection::vec(label(), 0..4)), 0..10)
    ) {
        let characteristics: CharacteristicsTable = entries
            .into_iter()
            .map(|(family, style, traits)| (FontKey::new(family, style), traits))
            .collect();
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("chars.scm");

        save_characteristics(&path, &characteristics).expect("save");
        let before = fs::read_to_string(&path).expect("read");
        let mut reloaded = CharacteristicsTable::new();
        load_characteristics(&path, &mut reloaded);
        save_characteristics(&path, &reloaded).expect("save again");

        prop_assert_eq!(before, fs::read_to_string(&path).expect("read"));
    }
}

#[test]
fn rebinding_a_location_twice_is_a_no_op() {
    let key = FontKey::new("Foo", "Regular");
    let location = Location::new("foo.ttf", 0, 1000);

    let mut once = FontTable::new();
    once.insert_unique(key.clone(), location.clone());
    let mut twice = once.clone();
    twice.insert_unique(key, location);

    assert_eq!(once, twice);
}
