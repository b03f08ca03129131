use std::path::Path;
use std::path::PathBuf;

use crate::ModuleVariableFiles;
use crate::VariableFile;
use crate::parse_content;

pub(crate) const MAIN_TF: &str = r#"locals {
  config_mount_path = "/etc/api"
}

module "api" {
  source = "./kubernetes-app"

  image_name = "${var.image_name}_api"
  command    = ["node", "dist/api"]
  replicas   = var.replicas
  ports = concat(
    [{ name = "http", container_port = 8080 }],
    var.extra_ports
  )
  # timeout = var.timeout
}

# override
variable "hpa_min_replicas" {
  type    = number
  default = 2
}
"#;

pub(crate) const VARIABLES_TF: &str = r#"variable "image_name" {
  type = string
}

variable "replicas" {
  type    = number
  default = 1
}

variable "port" {
  type    = number
  default = 8080
}
"#;

pub(crate) const VARIABLES_DEPLOYMENT_TF: &str = r#"variable "command" {
  type    = list(string)
  default = null
}

variable "ports" {
  type    = list(any)
  default = []
}

variable "extra_ports" {
  type    = list(any)
  default = []
}

variable "timeout" {
  type    = number
  default = 30
}
"#;

pub(crate) const VARIABLES_HPA_TF: &str = r#"variable "hpa_min_replicas" {
  type    = number
  default = 1
}

variable "hpa_max_replicas" {}
"#;

pub(crate) const PREVIOUS_INHERITED_TF: &str = r#"#~ MODULE api FILE kubernetes-app/variables.tf
variable "image_name" {
  type = string
}

# override
variable "replicas" {
  type    = number
  default = 66
}
"#;

pub(crate) const EXPECTED_MAIN_TF: &str = r#"locals {
  config_mount_path = "/etc/api"
}

module "api" {
  source = "./kubernetes-app"

  image_name = "${var.image_name}_api"
  replicas   = var.replicas
  port       = var.port

  #~ deployment
  command     = ["node", "dist/api"]
  ports = concat(
    [{ name = "http", container_port = 8080 }],
    var.extra_ports
  )

  extra_ports = var.extra_ports
  # timeout = var.timeout

  #~ hpa
  hpa_min_replicas = var.hpa_min_replicas
  hpa_max_replicas = var.hpa_max_replicas
}

# override
variable "hpa_min_replicas" {
  type    = number
  default = 2
}
"#;

pub(crate) const EXPECTED_INHERITED_TF: &str = r#"#~ MODULE api FILE kubernetes-app/variables.tf
variable "image_name" {
  type = string
}

# override
variable "replicas" {
  type    = number
  default = 66
}

variable "port" {
  type    = number
  default = 8080
}

#~ MODULE api FILE kubernetes-app/variables-deployment.tf
variable "extra_ports" {
  type    = list(any)
  default = []
}

#~ MODULE api FILE kubernetes-app/variables-hpa.tf
variable "hpa_max_replicas" {}
"#;

pub(crate) fn variable_file(folder: &str, file_name: &str, text: &str) -> VariableFile {
	VariableFile {
		path: PathBuf::from(folder).join(file_name),
		file_name: file_name.to_string(),
		content: parse_content(text),
	}
}

/// Variable files of the `api` module, in generation order.
pub(crate) fn api_module_files() -> ModuleVariableFiles {
	let mut files = ModuleVariableFiles::new();
	files.insert(
		"api".to_string(),
		vec![
			variable_file("kubernetes-app", "variables.tf", VARIABLES_TF),
			variable_file(
				"kubernetes-app",
				"variables-deployment.tf",
				VARIABLES_DEPLOYMENT_TF,
			),
			variable_file("kubernetes-app", "variables-hpa.tf", VARIABLES_HPA_TF),
		],
	);

	files
}

pub(crate) fn write_file(path: &Path, content: &str) {
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("create_dir_all: {e}"));
	}

	std::fs::write(path, content).unwrap_or_else(|e| panic!("write: {e}"));
}

pub(crate) fn read_file(path: &Path) -> String {
	std::fs::read_to_string(path).unwrap_or_else(|e| panic!("read: {e}"))
}

/// Lay out the `api` project under `root`.
pub(crate) fn write_api_project(root: &Path) {
	write_file(&root.join("main.tf"), MAIN_TF);
	write_file(&root.join("kubernetes-app/variables.tf"), VARIABLES_TF);
	write_file(
		&root.join("kubernetes-app/variables-deployment.tf"),
		VARIABLES_DEPLOYMENT_TF,
	);
	write_file(
		&root.join("kubernetes-app/variables-hpa.tf"),
		VARIABLES_HPA_TF,
	);
	write_file(&root.join("kubernetes-app/main.tf"), "resource \"null_resource\" \"this\" {}\n");
	write_file(&root.join("variables-inherited.tf"), PREVIOUS_INHERITED_TF);
}
