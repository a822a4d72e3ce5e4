// ABOUTME: Round-trip tests: a Manifest mirrored into a tree and rebuilt must export identically.
// ABOUTME: Exercises every collection kind, tri-state flags, and namespace-qualified property keys.

use vdbexport_core::{
    Condition, DataRole, Entry, ImportVdb, Manifest, Mask, Model, Permission, Severity, Source,
    Translator, TriState, ValidationMarker, VdbExporter, export_xml,
};
use vdbexport_store::{MemoryTree, mirror_manifest};

fn full_manifest() -> Manifest {
    let mut manifest = Manifest::new("Inventory");
    manifest.version = 7;
    manifest.description = "Stock levels <live>".to_string();
    manifest.connection_type = "BY_VERSION".to_string();
    manifest
        .properties
        .insert("{http://example.com/ext}cacheTtl".to_string(), "60".to_string());
    manifest
        .properties
        .insert("validationDateTime".to_string(), "2020-02-02".to_string());

    let mut physical = Model::new("stock");
    physical.description = "Warehouse tables".to_string();
    physical.metadata_type = "DDL".to_string();
    physical.model_definition = "CREATE FOREIGN TABLE items (id integer);".to_string();
    physical.sources.push(Source::new("pg-ds", "postgresql"));
    let mut jndi = Source::new("pg-ds-2", "postgresql");
    jndi.jndi_name = "java:/PgDS".to_string();
    physical.sources.push(jndi);
    let mut marker = ValidationMarker::new(Severity::Info, "Index missing");
    marker.path = "items/id".to_string();
    physical.markers.push(marker);
    manifest.models.push(physical);

    let mut view = Model::new("stockView");
    view.model_type = "VIRTUAL".to_string();
    view.visible = false;
    view.path_in_vdb = "/views/stock.xmi".to_string();
    manifest.models.push(view);

    let mut translator = Translator::new("pg-tuned", "postgresql");
    translator.description = "Larger batches".to_string();
    translator
        .properties
        .insert("{http://example.com/ext}batchSize".to_string(), "1000".to_string());
    manifest.translators.push(translator);

    let mut clerks = DataRole::new("clerks");
    clerks.description = "Counter staff".to_string();
    clerks.allow_create_temp_tables = true;
    clerks.mapped_role_names = vec!["clerk".to_string(), "staff".to_string()];
    let mut permission = Permission::new("stock.items");
    permission.allow_read = TriState::True;
    permission.allow_update = TriState::False;
    permission.allow_language = TriState::True;
    permission.conditions.push(Condition::new("qty > 0"));
    permission.conditions.push(Condition::new("amount / 2 > 10"));
    let mut strict = Condition::new("owner = user()");
    strict.constraint = false;
    permission.conditions.push(strict);
    let mut mask = Mask::new("cost / units[1]");
    mask.order = 3;
    permission.masks.push(mask);
    clerks.permissions.push(permission);
    clerks.permissions.push(Permission::new("stockView"));
    manifest.data_roles.push(clerks);

    let mut admins = DataRole::new("admins");
    admins.grant_all = true;
    admins.any_authenticated = true;
    manifest.data_roles.push(admins);

    let mut entry = Entry::new("/lib/udf.jar");
    entry.description = "User functions".to_string();
    entry.properties.insert("checksum".to_string(), "abc123".to_string());
    manifest.entries.push(entry);
    manifest.entries.push(Entry::new("/docs/notes.txt"));

    let mut import = ImportVdb::new("Shared", 2);
    import.import_data_policies = false;
    manifest.import_vdbs.push(import);

    manifest
}

#[test]
fn mirrored_manifest_rebuilds_equal() {
    let manifest = full_manifest();
    let mut tree = MemoryTree::new();
    let vdb = mirror_manifest(&mut tree, "/", &manifest).expect("mirror");

    let rebuilt = VdbExporter::default()
        .build_manifest(&tree, &vdb)
        .expect("rebuild");

    assert_eq!(rebuilt, manifest);
}

#[test]
fn mirrored_manifest_exports_identically() {
    let manifest = full_manifest();
    let mut tree = MemoryTree::new();
    let vdb = mirror_manifest(&mut tree, "/", &manifest).unwrap();

    let from_tree = VdbExporter::default().export(&tree, &vdb).unwrap();
    let direct = export_xml(&manifest).unwrap();

    assert_eq!(from_tree, direct);
}

#[test]
fn unset_flags_survive_the_round_trip() {
    let manifest = full_manifest();
    let mut tree = MemoryTree::new();
    let vdb = mirror_manifest(&mut tree, "/", &manifest).unwrap();

    let rebuilt = VdbExporter::default().build_manifest(&tree, &vdb).unwrap();
    let permission = &rebuilt.data_roles[0].permissions[0];

    assert!(permission.allow_create.is_unset());
    assert!(permission.allow_delete.is_unset());
    assert_eq!(permission.allow_update, TriState::False);
    assert!(rebuilt.data_roles[0].permissions[1].allow_read.is_unset());
}

#[test]
fn export_escapes_markup_and_parses_back() {
    let xml = export_xml(&full_manifest()).unwrap();

    assert!(xml.contains("<description>Stock levels &lt;live&gt;</description>"));

    let mut reader = quick_xml::Reader::from_str(&xml);
    let mut elements = 0;
    loop {
        match reader.read_event().expect("well-formed output") {
            quick_xml::events::Event::Eof => break,
            quick_xml::events::Event::Start(_) | quick_xml::events::Event::Empty(_) => {
                elements += 1
            }
            _ => {}
        }
    }
    assert!(elements > 20, "expected a full document, saw {} elements", elements);
}

#[test]
fn two_vdbs_in_one_tree_stay_separate() {
    let mut tree = MemoryTree::new();
    let first = mirror_manifest(&mut tree, "/", &full_manifest()).unwrap();
    let second = mirror_manifest(&mut tree, "/", &Manifest::new("Other")).unwrap();
    let exporter = VdbExporter::default();

    let other = exporter.export(&tree, &second).unwrap();
    let inventory = exporter.build_manifest(&tree, &first).unwrap();

    assert!(other.ends_with(r#"<vdb name="Other" version="1"/>"#));
    assert_eq!(inventory.models.len(), 2);
}

#[test]
fn rules_with_path_characters_round_trip() {
    let manifest = full_manifest();
    let mut tree = MemoryTree::new();
    let vdb = mirror_manifest(&mut tree, "/", &manifest).unwrap();

    let rebuilt = VdbExporter::default().build_manifest(&tree, &vdb).unwrap();
    let permission = &rebuilt.data_roles[0].permissions[0];

    let rules: Vec<&str> = permission.conditions.iter().map(|c| c.rule.as_str()).collect();
    assert_eq!(rules, vec!["qty > 0", "amount / 2 > 10", "owner = user()"]);
    assert_eq!(permission.masks[0].rule, "cost / units[1]");
}
