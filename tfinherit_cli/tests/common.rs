#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub const MAIN_TF: &str = r#"module "app" {
  source = "./app"

  name_prefix = "demo"
}
"#;

pub const VARIABLES_TF: &str = r#"variable "name_prefix" {
  type = string
}

variable "replicas" {
  type    = number
  default = 1
}
"#;

pub const VARIABLES_HPA_TF: &str = "variable \"hpa_max_replicas\" {}\n";

pub const EXPECTED_INHERITED_TF: &str = r#"#~ MODULE app FILE app/variables.tf
variable "replicas" {
  type    = number
  default = 1
}

#~ MODULE app FILE app/variables-hpa.tf
variable "hpa_max_replicas" {}
"#;

pub fn tfinherit_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("tfinherit"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("TFINHERIT_LOG");
	cmd
}

pub fn write_file(root: &Path, relative: &str, content: &str) -> std::io::Result<()> {
	let path = root.join(relative);

	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}

	std::fs::write(path, content)
}

/// A main file calling the local `app` module, which has two variable files.
pub fn write_app_project(root: &Path) -> std::io::Result<()> {
	write_file(root, "main.tf", MAIN_TF)?;
	write_file(root, "app/variables.tf", VARIABLES_TF)?;
	write_file(root, "app/variables-hpa.tf", VARIABLES_HPA_TF)?;
	write_file(root, "app/main.tf", "resource \"null_resource\" \"this\" {}\n")
}
