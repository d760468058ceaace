use std::io::Write;
use std::process::{Command, Output, Stdio};

fn odoo_domain(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_odoo-domain"))
        .args(args)
        .env_remove("ODOO_DOMAIN_CONFIG")
        .output()
        .expect("failed to execute process")
}

fn saved_domains() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .unwrap();
    writeln!(
        file,
        r#"format: text
domains:
  partners_active: "[('active','=','True'),'!',('customer_rank','=','0')]"
  partners_named: "('name','ilike','acme')"
  broken: "('name','=')"
"#
    )
    .unwrap();
    file
}

#[test]
fn prints_json_arguments() {
    let output = odoo_domain(&["[('name','=','My Name'),'&',('a','>','1'),('b','<','2')]"]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        value,
        serde_json::json!([["name", "=", "My Name"], ["&", ["a", ">", "1"], ["b", "<", "2"]]])
    );
}

#[test]
fn prints_yaml_arguments() {
    let output = odoo_domain(&["--format", "yaml", "('name','=','My Name')"]);
    assert!(output.status.success());

    let value: serde_yaml::Value = serde_yaml::from_slice(&output.stdout).unwrap();
    let expected: serde_yaml::Value = serde_yaml::from_str("[[name, '=', My Name]]").unwrap();
    assert_eq!(value, expected);
}

#[test]
fn empty_domain_is_an_empty_list() {
    let output = odoo_domain(&[""]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "[]");
}

#[test]
fn syntax_error_fails_with_position() {
    let output = odoo_domain(&["('name','=','My Name'),('name','=','My Name')"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid syntax at byte 22"), "{stderr}");
}

#[test]
fn reads_domain_from_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_odoo-domain"))
        .args(["--format", "text", "-"])
        .env_remove("ODOO_DOMAIN_CONFIG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to execute process");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"( 'a' , '=' , 'b' )\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "[('a','=','b')]\n");
}

#[test]
fn selects_saved_domains_by_pattern() {
    let config = saved_domains();
    let path = config.path().to_str().unwrap();

    let output = odoo_domain(&["--config", path, "--name", "partners_*"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "# domain 'partners_active'",
            "[('active','=','True'),'!',('customer_rank','=','0')]",
            "# domain 'partners_named'",
            "[('name','ilike','acme')]",
        ]
    );
}

#[test]
fn check_reports_broken_saved_domain() {
    let config = saved_domains();
    let path = config.path().to_str().unwrap();

    let output = odoo_domain(&["--config", path, "--name", "*", "--check"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("domain 'broken' is not a valid domain"), "{stderr}");
}

#[test]
fn unknown_saved_domain_fails() {
    let config = saved_domains();
    let path = config.path().to_str().unwrap();

    let output = odoo_domain(&["--config", path, "--name", "invoices"]);
    assert!(!output.status.success());
}
