use assert_cmd::cargo_bin;
use predicates::prelude::*;
use assert_cmd::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_cart_persists_across_runs() {
    let dir = tempdir().unwrap();
    let cart_path = dir.path().join("cart.json");

    // 1. First run: add two mugs.
    let mut csv1 = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv1, "op, id, name, price, quantity, stock").unwrap();
    writeln!(csv1, "add, 1, Mug, 12.50, 2, 10").unwrap();

    let mut cmd1 = Command::new(cargo_bin!("storefront-session"));
    cmd1.arg(csv1.path()).arg("--cart-path").arg(&cart_path);

    let output1 = cmd1.output().expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains("1,Mug,12.50,2,10"));

    // 2. Second run: rehydrate and add three more.
    let mut csv2 = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv2, "op, id, name, price, quantity, stock").unwrap();
    writeln!(csv2, "add, 1, Mug, 12.50, 3, 10").unwrap();

    let mut cmd2 = Command::new(cargo_bin!("storefront-session"));
    cmd2.arg(csv2.path()).arg("--cart-path").arg(&cart_path);

    let output2 = cmd2.output().expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);

    // Should have recovered the 2 and merged to 5.
    assert!(stdout2.contains("1,Mug,12.50,5,10"));
}

#[test]
fn test_corrupt_cart_file_degrades_to_empty() {
    let dir = tempdir().unwrap();
    let cart_path = dir.path().join("cart.json");
    std::fs::write(&cart_path, b"{definitely not json").unwrap();

    let mut csv = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv, "op, id, name, price, quantity, stock").unwrap();
    writeln!(csv, "add, 2, Shirt, 24.50, 1, 5").unwrap();

    let mut cmd = Command::new(cargo_bin!("storefront-session"));
    cmd.arg(csv.path()).arg("--cart-path").arg(&cart_path);

    // Corruption is silent: the run succeeds with only the new item.
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("2,Shirt,24.50,1,5"));
}

#[test]
fn test_clear_persists_an_empty_cart() {
    let dir = tempdir().unwrap();
    let cart_path = dir.path().join("cart.json");

    let mut csv1 = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv1, "op, id, name, price, quantity, stock").unwrap();
    writeln!(csv1, "add, 1, Mug, 12.50, 2, 10").unwrap();
    writeln!(csv1, "clear, , , , ,").unwrap();

    let mut cmd1 = Command::new(cargo_bin!("storefront-session"));
    cmd1.arg(csv1.path()).arg("--cart-path").arg(&cart_path);
    cmd1.assert().success();

    // A later session sees the empty cart, not the pre-clear items.
    let mut csv2 = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv2, "op, id, name, price, quantity, stock").unwrap();

    let mut cmd2 = Command::new(cargo_bin!("storefront-session"));
    cmd2.arg(csv2.path()).arg("--cart-path").arg(&cart_path);
    cmd2.assert()
        .success()
        .stdout(predicate::str::contains("Mug").not());
}
