use colfam::{FamilyDef, RawPath, Slice, Store, StoreOptions, TableDef, WriteOptions};

fn main() {
    println!("colfam Simple Example");

    let defs = vec![TableDef::new(
        "Table1",
        vec![
            FamilyDef::simple("Standard1"),
            FamilyDef::super_family("Super1"),
        ],
    )];
    let store = Store::open(defs, StoreOptions::default()).expect("Failed to open store");

    let write_opts = WriteOptions::default();

    store
        .insert(
            "Table1",
            Slice::from("alice"),
            &RawPath::column("Standard1", Slice::from("age")),
            Slice::from("30"),
            0,
            &write_opts,
        )
        .expect("Failed to insert");
    store
        .insert(
            "Table1",
            Slice::from("alice"),
            &RawPath::column("Standard1", Slice::from("city")),
            Slice::from("Paris"),
            0,
            &write_opts,
        )
        .expect("Failed to insert");

    let age = store
        .get_column(
            "Table1",
            &Slice::from("alice"),
            &RawPath::column("Standard1", Slice::from("age")),
        )
        .expect("Failed to get");
    println!("alice/age = {}", age.value);

    let columns = store
        .get_slice(
            "Table1",
            &Slice::from("alice"),
            &RawPath::family("Standard1"),
            &Slice::empty(),
            &Slice::empty(),
            true,
            1000,
        )
        .expect("Failed to slice");
    println!("alice has {} visible columns", columns.len());

    // overwrite with a later timestamp
    store
        .insert(
            "Table1",
            Slice::from("alice"),
            &RawPath::column("Standard1", Slice::from("age")),
            Slice::from("31"),
            1,
            &write_opts,
        )
        .expect("Failed to update");
    let age = store
        .get_column(
            "Table1",
            &Slice::from("alice"),
            &RawPath::column("Standard1", Slice::from("age")),
        )
        .expect("Failed to get");
    println!("alice/age is now {}", age.value);

    // tombstone the column
    store
        .remove(
            "Table1",
            Slice::from("alice"),
            &RawPath::column("Standard1", Slice::from("age")),
            2,
            &write_opts,
        )
        .expect("Failed to remove");
    match store.get_column(
        "Table1",
        &Slice::from("alice"),
        &RawPath::column("Standard1", Slice::from("age")),
    ) {
        Ok(age) => println!("alice/age = {}", age.value),
        Err(_) => println!("alice/age has been deleted"),
    }

    let keys = store
        .get_key_range("Table1", "Standard1", &Slice::empty(), &Slice::empty(), 100)
        .expect("Failed to scan");
    println!("keys with visible data: {}", keys.len());

    store.close().expect("Failed to close store");
    println!("Store closed successfully");
}
