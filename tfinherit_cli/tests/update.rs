mod common;

use tfinherit_core::AnyEmptyResult;

#[test]
fn update_generates_main_and_inherited_files() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_app_project(tmp.path())?;

	common::tfinherit_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Generated variables-inherited.tf"))
		.stdout(predicates::str::contains("Updated main.tf"));

	let main = std::fs::read_to_string(tmp.path().join("main.tf"))?;
	assert!(main.contains("  name_prefix = \"demo\"\n"));
	assert!(main.contains("  replicas    = var.replicas\n"));
	assert!(main.contains("  #~ hpa\n  hpa_max_replicas = var.hpa_max_replicas\n}\n"));

	let inherited = std::fs::read_to_string(tmp.path().join("variables-inherited.tf"))?;
	assert_eq!(inherited, common::EXPECTED_INHERITED_TF);

	Ok(())
}

#[test]
fn update_noop_when_in_sync() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_app_project(tmp.path())?;

	common::tfinherit_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	let main = std::fs::read_to_string(tmp.path().join("main.tf"))?;

	common::tfinherit_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("already up to date"));

	assert_eq!(std::fs::read_to_string(tmp.path().join("main.tf"))?, main);

	Ok(())
}

#[test]
fn update_dry_run_does_not_write() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_app_project(tmp.path())?;

	common::tfinherit_cmd()
		.arg("update")
		.arg("--dry-run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Dry run: would write 2 file(s):"))
		.stdout(predicates::str::contains("variables-inherited.tf"));

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("main.tf"))?,
		common::MAIN_TF
	);
	assert!(!tmp.path().join("variables-inherited.tf").exists());

	Ok(())
}

#[test]
fn update_keeps_override_declarations() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_app_project(tmp.path())?;
	common::write_file(
		tmp.path(),
		"variables-inherited.tf",
		"# override\nvariable \"replicas\" {\n  default = 3\n}\n",
	)?;

	common::tfinherit_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	let inherited = std::fs::read_to_string(tmp.path().join("variables-inherited.tf"))?;
	assert!(inherited.contains("# override\nvariable \"replicas\" {\n  default = 3\n}\n"));
	assert!(!inherited.contains("default = 1"));

	Ok(())
}

#[test]
fn update_uses_main_file_flag() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_app_project(tmp.path())?;
	std::fs::rename(tmp.path().join("main.tf"), tmp.path().join("stack.tf"))?;

	common::tfinherit_cmd()
		.arg("update")
		.arg("--main-file")
		.arg("stack.tf")
		.arg("--inherited-file")
		.arg("inherited.tf")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Updated stack.tf"));

	let stack = std::fs::read_to_string(tmp.path().join("stack.tf"))?;
	assert!(stack.contains("replicas    = var.replicas"));
	assert!(tmp.path().join("inherited.tf").exists());
	assert!(!tmp.path().join("variables-inherited.tf").exists());

	Ok(())
}

#[test]
fn update_fails_without_module_block() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let content = "locals {\n  region = \"eu-west-1\"\n}\n";
	common::write_file(tmp.path(), "main.tf", content)?;

	common::tfinherit_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("tfinherit::no_module_found"));

	assert_eq!(std::fs::read_to_string(tmp.path().join("main.tf"))?, content);
	assert!(!tmp.path().join("variables-inherited.tf").exists());

	Ok(())
}

#[test]
fn update_fails_on_unclosed_module_block() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_app_project(tmp.path())?;
	let content = "module \"app\" {\n  source = \"./app\"\n";
	common::write_file(tmp.path(), "main.tf", content)?;

	common::tfinherit_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("tfinherit::unclosed_block"));

	assert_eq!(std::fs::read_to_string(tmp.path().join("main.tf"))?, content);

	Ok(())
}

#[test]
fn update_fails_when_main_file_is_missing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::tfinherit_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("tfinherit::file_not_found"));

	Ok(())
}
