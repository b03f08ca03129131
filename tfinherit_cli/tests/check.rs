mod common;

use serde_json::Value;
use tfinherit_core::AnyEmptyResult;

#[test]
fn check_fails_when_stale() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_app_project(tmp.path())?;

	common::tfinherit_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(predicates::str::contains("Stale files:"))
		.stderr(predicates::str::contains("  variables-inherited.tf (missing)"))
		.stderr(predicates::str::contains("  main.tf\n"))
		.stderr(predicates::str::contains("2 file(s) are out of date"));

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("main.tf"))?,
		common::MAIN_TF
	);

	Ok(())
}

#[test]
fn check_passes_after_update() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_app_project(tmp.path())?;

	common::tfinherit_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	common::tfinherit_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("up to date"));

	Ok(())
}

#[test]
fn check_diff_shows_missing_assignments() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_app_project(tmp.path())?;

	common::tfinherit_cmd()
		.arg("check")
		.arg("--diff")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(predicates::str::contains("+  replicas    = var.replicas"))
		.stderr(predicates::str::contains("+variable \"hpa_max_replicas\" {}"));

	Ok(())
}

#[test]
fn check_json_lists_stale_files() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_app_project(tmp.path())?;

	let output = common::tfinherit_cmd()
		.arg("check")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.output()?;

	assert_eq!(output.status.code(), Some(1));

	let report: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(report["ok"], Value::Bool(false));

	let stale = report["stale"].as_array().ok_or("stale is not an array")?;
	assert_eq!(stale.len(), 2);
	assert_eq!(stale[0]["file"], "variables-inherited.tf");
	assert_eq!(stale[0]["exists"], Value::Bool(false));
	assert_eq!(stale[0]["current"], Value::Null);
	assert_eq!(stale[0]["expected"], common::EXPECTED_INHERITED_TF);
	assert_eq!(stale[1]["file"], "main.tf");
	assert_eq!(stale[1]["current"], common::MAIN_TF);

	Ok(())
}

#[test]
fn check_json_reports_ok() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_app_project(tmp.path())?;

	common::tfinherit_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	let output = common::tfinherit_cmd()
		.arg("check")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.output()?;

	assert!(output.status.success());

	let report: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(report["ok"], Value::Bool(true));
	assert_eq!(report["stale"], Value::Array(vec![]));

	Ok(())
}

#[test]
fn no_subcommand_prints_usage_hint() -> AnyEmptyResult {
	common::tfinherit_cmd()
		.assert()
		.code(1)
		.stderr(predicates::str::contains("tfinherit --help"));

	Ok(())
}
