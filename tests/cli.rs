//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use std::path::Path;

    use assert_cmd::Command;

    fn autotranslate(state_dir: &Path) -> Command {
        let mut cmd = Command::cargo_bin("autotranslate").unwrap();
        cmd.current_dir(state_dir)
            .env("AUTOTRANSLATE_STATE_DIR", state_dir)
            .env("AUTOTRANSLATE_SETTLE_DELAY_MS", "0")
            .env("NO_COLOR", "1")
            .env_remove("AUTOTRANSLATE_LANGUAGE")
            .env_remove("AUTOTRANSLATE_API_URL")
            .env_remove("AUTOTRANSLATE_API_KEY");
        cmd
    }

    #[test]
    fn english_passes_document_through() {
        let dir = tempfile::tempdir().unwrap();
        let out = autotranslate(dir.path())
            .args(["--language", "en"])
            .write_stdin("<p>  Hello  </p>")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "<html lang=\"en\" dir=\"ltr\"><head></head><body><p>  Hello  </p></body></html>"
        );
    }

    #[test]
    fn select_language_persists() {
        let dir = tempfile::tempdir().unwrap();

        let out = autotranslate(dir.path()).args(["language", "es"]).assert().success().get_output().stdout.clone();
        assert!(String::from_utf8(out).unwrap().contains("Español (es)"));

        let saved = std::fs::read_to_string(dir.path().join("preferences.json")).unwrap();
        assert!(saved.contains("\"es\""));

        let out = autotranslate(dir.path()).arg("language").assert().success().get_output().stdout.clone();
        assert!(String::from_utf8(out).unwrap().contains("* es"));
    }

    #[test]
    fn init_config_writes_example() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("autotranslate.toml");

        autotranslate(dir.path()).arg("init-config").arg(&file).assert().success();

        let content = std::fs::read_to_string(&file).unwrap();
        assert!(content.contains("api_key = \"YOUR_API_KEY\""));
        assert!(content.contains("settle_delay_ms = 500"));
    }

    #[test]
    fn cache_stats_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("translation-cache-v2.json"),
            r#"{"version": 2, "saved_at": "2024-01-01T00:00:00Z", "entries": {"Hello": {"es": "Hola", "it": "Ciao"}}}"#,
        )
        .unwrap();

        let out = autotranslate(dir.path()).args(["cache", "stats"]).assert().success().get_output().stdout.clone();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("原文: 1"));
        assert!(out.contains("译文: 2"));

        autotranslate(dir.path()).args(["cache", "clear"]).assert().success();
        assert!(!dir.path().join("translation-cache-v2.json").exists());
    }

    #[test]
    fn env_docs_lists_variables() {
        let dir = tempfile::tempdir().unwrap();
        let out = autotranslate(dir.path()).arg("env-docs").assert().success().get_output().stdout.clone();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("AUTOTRANSLATE_API_KEY"));
        assert!(out.contains("AUTOTRANSLATE_SETTLE_DELAY_MS"));
    }
}

//  ███████╗ █████╗ ██╗██╗     ██╗███╗   ██╗ ██████╗
//  ██╔════╝██╔══██╗██║██║     ██║████╗  ██║██╔════╝
//  █████╗  ███████║██║██║     ██║██╔██╗ ██║██║  ███╗
//  ██╔══╝  ██╔══██║██║██║     ██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║██║███████╗██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚═╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod failing {
    use assert_cmd::Command;

    #[test]
    fn unknown_language_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        Command::cargo_bin("autotranslate")
            .unwrap()
            .current_dir(dir.path())
            .env("AUTOTRANSLATE_STATE_DIR", dir.path())
            .args(["language", "fr"])
            .assert()
            .failure();
        assert!(!dir.path().join("preferences.json").exists());
    }

    #[test]
    fn missing_input_file() {
        let dir = tempfile::tempdir().unwrap();
        Command::cargo_bin("autotranslate")
            .unwrap()
            .current_dir(dir.path())
            .env("AUTOTRANSLATE_STATE_DIR", dir.path())
            .env("NO_COLOR", "1")
            .args(["--language", "es", "does-not-exist.html"])
            .assert()
            .failure()
            .code(1);
    }

    #[test]
    fn invalid_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("bad.toml");
        std::fs::write(&config, "api_url = \"ftp://example.com\"").unwrap();

        Command::cargo_bin("autotranslate")
            .unwrap()
            .current_dir(dir.path())
            .args(["--config"])
            .arg(&config)
            .args(["--language", "en"])
            .write_stdin("<p>x</p>")
            .assert()
            .failure();
    }
}
