use std::fs;
use std::path::Path;

use assert_cmd::Command;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use predicates::prelude::*;

fn receipt() -> Command {
    Command::cargo_bin("receipt").unwrap()
}

/// Write a one-page receipt PDF with one text line per entry.
fn write_receipt_pdf(path: &Path, lines: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 10.into()]),
        Operation::new("Td", vec![40.into(), 780.into()]),
    ];
    for line in lines {
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("Td", vec![0.into(), (-20).into()]));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

const RECEIPT_LINES: [&str; 4] = [
    "Mar 24, 2024 order #2000123-45678",
    "Great Value Whole Milk Shopped Qty 2 $3.50",
    "Fresh Bananas, each 1.25 lb $0.75",
    "Tax 1 6.250 % $0.42",
];

#[test]
fn test_process_writes_default_output() {
    let dir = tempfile::tempdir().unwrap();
    write_receipt_pdf(&dir.path().join("walmart.pdf"), &RECEIPT_LINES);

    receipt()
        .current_dir(dir.path())
        .args(["process", "walmart.pdf"])
        .assert()
        .success()
        .stdout(predicate::str::contains("walmart_parsed.csv"));

    assert_eq!(
        fs::read_to_string(dir.path().join("walmart_parsed.csv")).unwrap(),
        "date,store,item,qty_wgt,price\n\
         2024-03-24,Walmart,Great Value Whole Milk,2,3.50\n\
         2024-03-24,Walmart,Fresh Bananas,1.25 lb,0.75\n\
         2024-03-24,Walmart,Tax,,0.42\n"
    );
}

#[test]
fn test_process_with_category_table() {
    let dir = tempfile::tempdir().unwrap();
    write_receipt_pdf(&dir.path().join("walmart.pdf"), &RECEIPT_LINES);
    let table = dir.path().join("categories.csv");
    fs::write(&table, "Item,Category,Sub-Category\nGreat Value Whole Milk,Grocery,Dairy\n").unwrap();

    receipt()
        .current_dir(dir.path())
        .args(["process", "walmart.pdf", "-o", "-", "--categories"])
        .arg(&table)
        .assert()
        .success()
        .stdout(
            "date,store,item,qty_wgt,price,category,sub-category\n\
             2024-03-24,Walmart,Great Value Whole Milk,2,3.50,Grocery,Dairy\n\
             2024-03-24,Walmart,Fresh Bananas,1.25 lb,0.75,Grocery,Veggies\n\
             2024-03-24,Walmart,Tax,,0.42,Tax,Tax\n",
        );

    // Read-only table is never written to
    assert_eq!(
        fs::read_to_string(&table).unwrap(),
        "Item,Category,Sub-Category\nGreat Value Whole Milk,Grocery,Dairy\n"
    );
}

#[test]
fn test_interactive_prompt_keeps_stdout_clean() {
    let dir = tempfile::tempdir().unwrap();
    write_receipt_pdf(&dir.path().join("walmart.pdf"), &RECEIPT_LINES);
    let master = dir.path().join("master.csv");
    fs::write(&master, "Item,Category,Sub-Category\nGreat Value Whole Milk,Grocery,Dairy\n").unwrap();

    // Without a terminal every prompt is skipped
    receipt()
        .current_dir(dir.path())
        .args(["process", "walmart.pdf", "-o", "-", "--interactive", "--master"])
        .arg(&master)
        .assert()
        .success()
        .stdout(
            "date,store,item,qty_wgt,price,category,sub-category\n\
             2024-03-24,Walmart,Great Value Whole Milk,2,3.50,Grocery,Dairy\n\
             2024-03-24,Walmart,Fresh Bananas,1.25 lb,0.75,Uncategorized,Uncategorized\n\
             2024-03-24,Walmart,Tax,,0.42,Uncategorized,Uncategorized\n",
        )
        .stderr(predicate::str::contains("Unknown item"));

    assert_eq!(
        fs::read_to_string(&master).unwrap(),
        "Item,Category,Sub-Category\nGreat Value Whole Milk,Grocery,Dairy\n"
    );
}

#[test]
fn test_help_lists_subcommands() {
    receipt()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_process_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    receipt()
        .current_dir(dir.path())
        .args(["process", "missing.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_process_unreadable_pdf_fails() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.pdf"), "not a pdf").unwrap();

    receipt()
        .current_dir(dir.path())
        .args(["process", "broken.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.pdf"));
    assert!(!dir.path().join("broken_parsed.csv").exists());
}

#[test]
fn test_batch_empty_directory_creates_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("receipts");
    fs::create_dir(&input).unwrap();
    let output = dir.path().join("out");

    receipt()
        .arg("batch")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("No PDF files found"));
    assert!(output.is_dir());
}

#[test]
fn test_batch_continues_past_bad_pdf_and_combines() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("receipts");
    fs::create_dir(&input).unwrap();
    fs::write(input.join("broken.pdf"), "not a pdf").unwrap();

    let output = dir.path().join("out");
    fs::create_dir(&output).unwrap();
    fs::write(
        output.join("earlier.csv"),
        "date,store,item,qty_wgt,price\n2024-03-24,Walmart,Milk,1,3.50\nUnknown,Walmart,Eggs,1,2.00\n",
    )
    .unwrap();

    receipt()
        .arg("batch")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--combine")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 failed"));

    let combined = fs::read_to_string(output.join("combined_receipts.csv")).unwrap();
    assert_eq!(
        combined,
        "date,store,item,qty_wgt,price\n2024-03-24,Walmart,Milk,1,3.50\nUnknown,Walmart,Eggs,1,2.00\n"
    );
}

#[test]
fn test_interactive_requires_master() {
    let dir = tempfile::tempdir().unwrap();

    receipt()
        .arg("batch")
        .arg(dir.path())
        .arg("-o")
        .arg(dir.path().join("out"))
        .arg("--interactive")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--master"));
}

#[test]
fn test_batch_rejects_malformed_master() {
    let dir = tempfile::tempdir().unwrap();
    let master = dir.path().join("master.csv");
    fs::write(&master, "name,kind\nMilk,Dairy\n").unwrap();

    receipt()
        .arg("batch")
        .arg(dir.path())
        .arg("-o")
        .arg(dir.path().join("out"))
        .arg("--master")
        .arg(&master)
        .assert()
        .failure();
}

#[test]
fn test_config_init_and_get() {
    let home = tempfile::tempdir().unwrap();

    receipt()
        .env("XDG_CONFIG_HOME", home.path())
        .env("HOME", home.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));

    receipt()
        .env("XDG_CONFIG_HOME", home.path())
        .env("HOME", home.path())
        .args(["config", "get", "parser.store_name"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Walmart"));

    receipt()
        .env("XDG_CONFIG_HOME", home.path())
        .env("HOME", home.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn test_config_file_drives_interactive_batch() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("receipt.json");
    let master = dir.path().join("master.csv");
    fs::write(&master, "Item,Category,Sub-Category\n").unwrap();
    let input = dir.path().join("receipts");
    fs::create_dir(&input).unwrap();

    receipt()
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "categories.master_path"])
        .arg(dir.path().join("missing.csv"))
        .assert()
        .failure();

    receipt()
        .arg("-c")
        .arg(&config)
        .args(["config", "init", "--master"])
        .arg(&master)
        .assert()
        .success();

    receipt()
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "categories.interactive", "true"])
        .assert()
        .success();

    receipt()
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "categories.master_path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("master.csv"));

    receipt()
        .arg("-c")
        .arg(&config)
        .arg("batch")
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("out"))
        .assert()
        .success();
}

#[test]
fn test_config_rejects_unknown_key() {
    receipt()
        .args(["config", "get", "ocr.model"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("parser.store_name"));
}
