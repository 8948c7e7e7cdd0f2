use std::fs;

use k8s_oidc_helper::{generate_auth_info, Kubeconfig};

const EXISTING: &str = "\
apiVersion: v1
kind: Config
clusters:
- cluster:
    server: https://k8s.example.com
  name: prod
contexts:
- context:
    cluster: prod
    user: jane@example.com
  name: prod
current-context: prod
users:
- name: robot
  user:
    token: robot-token
";

fn fresh_auth_info() -> k8s_oidc_helper::AuthInfo {
    generate_auth_info(
        "https://accounts.google.com",
        "client",
        "secret",
        "id-token",
        "refresh-token",
    )
}

#[test]
fn merge_into_existing_file_keeps_other_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config");
    fs::write(&path, EXISTING).unwrap();

    let mut config = Kubeconfig::read_from(&path).unwrap();
    config.upsert_auth_info("jane@example.com", fresh_auth_info());
    config.write_to(&path).unwrap();

    let written = Kubeconfig::read_from(&path).unwrap();
    assert_eq!(written.clusters.len(), 1);
    assert_eq!(written.contexts.len(), 1);
    assert_eq!(written.current_context.as_deref(), Some("prod"));
    assert_eq!(
        written.auth_infos.iter().map(|u| u.name.as_str()).collect::<Vec<_>>(),
        vec!["robot", "jane@example.com"]
    );
    assert_eq!(written.auth_info("jane@example.com"), Some(&fresh_auth_info()));
    assert!(written.auth_info("robot").unwrap().other.contains_key("token"));
}

#[test]
fn writing_twice_replaces_the_user() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config");

    for id_token in ["first", "second"] {
        let mut config = Kubeconfig::read_from(&path).unwrap();
        config.upsert_auth_info(
            "jane@example.com",
            generate_auth_info("https://accounts.google.com", "c", "s", id_token, "r"),
        );
        config.write_to(&path).unwrap();
    }

    let written = Kubeconfig::read_from(&path).unwrap();
    assert_eq!(written.auth_infos.len(), 1);
    let provider = written
        .auth_info("jane@example.com")
        .and_then(|info| info.auth_provider.as_ref())
        .unwrap();
    assert_eq!(provider.config["id-token"], "second");
}

#[test]
fn missing_file_and_directories_are_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".kube").join("config");

    let mut config = Kubeconfig::read_from(&path).unwrap();
    assert_eq!(config, Kubeconfig::default());

    config.upsert_auth_info("jane@example.com", fresh_auth_info());
    config.write_to(&path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("apiVersion: v1"));
    assert!(text.contains("name: oidc"));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

#[test]
fn invalid_yaml_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config");
    fs::write(&path, "users: [unterminated").unwrap();

    assert!(matches!(
        Kubeconfig::read_from(&path),
        Err(k8s_oidc_helper::Error::Yaml(_))
    ));
}
