#[cfg(test)]
mod cli_help_tests {
    use assert_cmd::prelude::*;
    use predicates::prelude::*;
    use std::process::Command;

    #[test]
    fn test_cli_help_output() {
        let mut cmd = Command::cargo_bin("houndtrainer").unwrap();

        let assert_result = cmd.arg("--help").assert().success();
        let output = assert_result.get_output();
        let help_output = String::from_utf8_lossy(&output.stdout);

        assert!(help_output.contains("Usage:"));
        assert!(help_output.contains("Options:"));
        assert!(help_output.contains("Commands:"));

        assert!(help_output.contains("nodes"));
        assert!(help_output.contains("queries"));
        assert!(help_output.contains("config"));

        assert!(help_output.contains("--url"));
        assert!(help_output.contains("-h, --help"));
        assert!(help_output.contains("-V, --version"));
        assert!(help_output.contains("houndtrainer"));
    }

    #[test]
    fn test_cli_subcommand_help_outputs() {
        let expected = [
            ("nodes", vec!["list", "get", "upload", "synthesize", "export", "delete", "delete-all"]),
            ("queries", vec!["list", "get", "upload", "export", "delete", "delete-all"]),
            ("config", vec!["get", "path", "set"]),
        ];

        for (subcommand, operations) in expected {
            let mut cmd = Command::cargo_bin("houndtrainer").unwrap();
            let assert_result = cmd.arg(subcommand).arg("--help").assert().success();
            let output = assert_result.get_output();
            let help_output = String::from_utf8_lossy(&output.stdout);

            assert!(
                help_output.contains("Usage:"),
                "Help for {} should contain Usage",
                subcommand
            );
            for operation in operations {
                assert!(
                    help_output.contains(operation),
                    "Help for {} should list {}",
                    subcommand,
                    operation
                );
            }
        }
    }

    #[test]
    fn test_missing_subcommand_shows_help() {
        let mut cmd = Command::cargo_bin("houndtrainer").unwrap();
        cmd.assert()
            .failure()
            .stderr(predicate::str::contains("Usage:"));
    }

    #[test]
    fn test_export_without_selector_is_usage_error() {
        let mut cmd = Command::cargo_bin("houndtrainer").unwrap();
        cmd.args(["nodes", "export", "--output", "model.json"])
            .assert()
            .failure()
            .code(2)
            .stderr(predicate::str::contains("--kind"));
    }
}
