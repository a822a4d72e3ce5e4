// ABOUTME: End-to-end tests for the export pipeline: fixture file -> MemoryTree -> builder -> XML.
// ABOUTME: Covers the exact raw document, pretty printing, ordering options, failures, and concurrent use.

use std::path::PathBuf;

use vdbexport_core::lexicon::tree as lex;
use vdbexport_core::{BuildError, ExportError, ExportOptions, VdbExporter};
use vdbexport_store::{MemoryTree, load_fixture};

const SALES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8"?>"#,
    r#"<vdb name="SalesVDB" version="3">"#,
    r#"<description>Sales &amp; orders</description>"#,
    r#"<connection-type>BY_VERSION</connection-type>"#,
    r#"<property name="{http://example.com/ext}cacheTtl" value="30"/>"#,
    r#"<property name="UseConnectorMetadata" value="true"/>"#,
    r#"<import-vdb name="Base" version="1" import-data-policies="true"/>"#,
    r#"<model name="ordersModel">"#,
    r#"<description>Order tables</description>"#,
    r#"<metadata type="DDL"><![CDATA[CREATE FOREIGN TABLE orders (id integer) OPTIONS (x 'a < b');]]></metadata>"#,
    r#"<source name="oracle-ds" translator-name="oracle" jndi-name="java:/OracleDS"/>"#,
    r#"<validation-error severity="WARNING" path="orders/id">Column has no type</validation-error>"#,
    r#"</model>"#,
    r#"<model name="reportsView" type="VIRTUAL" visible="false"/>"#,
    r#"<translator name="oracle-override" type="oracle" description="Tuned oracle">"#,
    r#"<property name="{http://example.com/ext}batchSize" value="500"/>"#,
    r#"</translator>"#,
    r#"<data-role name="writers" any-authenticated="false" allow-create-temp-tables="false" grant-all="true">"#,
    r#"<permission>"#,
    r#"<resource-name>ordersModel.orders</resource-name>"#,
    r#"<allow-read>true</allow-read>"#,
    r#"<allow-delete>false</allow-delete>"#,
    r#"<condition constraint="false">amount &gt; 100</condition>"#,
    r#"<mask order="2">salary</mask>"#,
    r#"</permission>"#,
    r#"<mapped-role-name>sales</mapped-role-name>"#,
    r#"<mapped-role-name>admin</mapped-role-name>"#,
    r#"</data-role>"#,
    r#"<data-role name="auditors" any-authenticated="true" allow-create-temp-tables="false" grant-all="false"/>"#,
    r#"<entry path="/docs/readme.txt"><description>Read me first</description></entry>"#,
    r#"</vdb>"#,
);

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sales.yaml")
}

fn sales_tree() -> MemoryTree {
    load_fixture(&fixture_path()).expect("sales fixture should load")
}

#[test]
fn fixture_exports_expected_document() {
    let tree = sales_tree();
    let vdb = tree.node("/workspace/SalesVDB").expect("vdb node");

    let xml = VdbExporter::default().export(&tree, &vdb).expect("export");

    assert_eq!(xml, SALES_XML);
}

#[test]
fn fixture_lists_both_vdbs() {
    let tree = sales_tree();
    let paths: Vec<String> = tree
        .nodes_of_type(lex::VIRTUAL_DATABASE)
        .into_iter()
        .map(|node| node.path)
        .collect();
    assert_eq!(paths, vec!["/workspace/SalesVDB", "/Scratch"]);
}

#[test]
fn bare_vdb_exports_name_and_version_only() {
    let tree = sales_tree();
    let vdb = tree.node("/Scratch").expect("scratch node");

    let xml = VdbExporter::default().export(&tree, &vdb).unwrap();

    assert_eq!(
        xml,
        r#"<?xml version="1.0" encoding="UTF-8"?><vdb name="Scratch" version="1"/>"#
    );
}

#[test]
fn export_is_deterministic() {
    let tree = sales_tree();
    let vdb = tree.node("/workspace/SalesVDB").unwrap();
    let exporter = VdbExporter::default();

    let first = exporter.export(&tree, &vdb).unwrap();
    let second = exporter.export(&tree, &vdb).unwrap();

    assert_eq!(first, second);
}

#[test]
fn pretty_output_matches_raw_once_whitespace_is_removed() {
    let tree = sales_tree();
    let vdb = tree.node("/workspace/SalesVDB").unwrap();
    let exporter = VdbExporter::new(ExportOptions {
        pretty_print: true,
        indent: 2,
        ..ExportOptions::default()
    });

    let pretty = exporter.export(&tree, &vdb).unwrap();

    assert!(pretty.contains("\n  <model name=\"reportsView\" type=\"VIRTUAL\" visible=\"false\"/>"));
    assert!(pretty.contains("\n      <resource-name>ordersModel.orders</resource-name>"));
    let collapsed: String = pretty.lines().map(str::trim_start).collect();
    assert_eq!(collapsed, SALES_XML);
}

#[test]
fn sorting_data_roles_is_opt_in() {
    let tree = sales_tree();
    let vdb = tree.node("/workspace/SalesVDB").unwrap();

    let unsorted = VdbExporter::default().export(&tree, &vdb).unwrap();
    let sorted = VdbExporter::new(ExportOptions {
        sort_data_roles: true,
        ..ExportOptions::default()
    })
    .export(&tree, &vdb)
    .unwrap();

    let position = |xml: &str, role: &str| {
        xml.find(&format!("<data-role name=\"{}\"", role))
            .expect("data role present")
    };
    assert!(position(&unsorted, "writers") < position(&unsorted, "auditors"));
    assert!(position(&sorted, "auditors") < position(&sorted, "writers"));
}

#[test]
fn custom_filter_controls_copied_properties() {
    let tree = sales_tree();
    let vdb = tree.node("/workspace/SalesVDB").unwrap();
    let exporter =
        VdbExporter::default().with_filter(|name: &str| name == "UseConnectorMetadata");

    let manifest = exporter.build_manifest(&tree, &vdb).unwrap();

    let keys: Vec<&str> = manifest.properties.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["UseConnectorMetadata"]);
    assert!(manifest.translators[0].properties.is_empty());
}

#[test]
fn missing_source_translator_fails_the_whole_export() {
    let mut tree = MemoryTree::new();
    let vdb = tree.add_node("/", "Broken", lex::VIRTUAL_DATABASE).unwrap();
    let model = tree.add_node(&vdb.path, "m", lex::DECLARATIVE_MODEL).unwrap();
    let sources = tree.add_node(&model.path, lex::SOURCES, lex::SOURCES).unwrap();
    tree.add_node(&sources.path, "ds", lex::SOURCE).unwrap();

    let err = VdbExporter::default().export(&tree, &vdb).unwrap_err();

    match err {
        ExportError::Build { vdb, source } => {
            assert_eq!(vdb, "/Broken");
            assert!(
                matches!(source, BuildError::MissingRequiredField { ref field, .. } if field == lex::SOURCE_TRANSLATOR),
                "unexpected cause: {:?}",
                source
            );
        }
        other => panic!("expected build error, got {:?}", other),
    }
}

#[test]
fn malformed_version_is_reported() {
    let mut tree = MemoryTree::new();
    let vdb = tree.add_node("/", "V", lex::VIRTUAL_DATABASE).unwrap();
    tree.set_property(&vdb.path, lex::VERSION, "two").unwrap();

    let err = VdbExporter::default().export(&tree, &vdb).unwrap_err();

    assert!(matches!(
        err,
        ExportError::Build {
            source: BuildError::MalformedProperty { .. },
            ..
        }
    ));
}

#[test]
fn one_exporter_serves_concurrent_exports() {
    let exporter = VdbExporter::default();
    let trees: Vec<MemoryTree> = (0..4).map(|_| sales_tree()).collect();

    let outputs: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = trees
            .iter()
            .map(|tree| {
                let exporter = &exporter;
                scope.spawn(move || {
                    let vdb = tree.node("/workspace/SalesVDB").unwrap();
                    exporter.export(tree, &vdb).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(outputs.iter().all(|xml| xml == SALES_XML));
}

#[test]
fn manifest_model_serializes_to_json() {
    let tree = sales_tree();
    let vdb = tree.node("/workspace/SalesVDB").unwrap();

    let manifest = VdbExporter::default().build_manifest(&tree, &vdb).unwrap();
    let json = serde_json::to_value(&manifest).unwrap();

    assert_eq!(json["name"], "SalesVDB");
    assert_eq!(json["version"], 3);
    assert_eq!(json["models"].as_array().map(Vec::len), Some(2));
}
