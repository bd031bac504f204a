use std::process::Command;

#[test]
fn refuses_to_start_with_missing_settings() {
    let output = Command::new(env!("CARGO_BIN_EXE_autodeploy"))
        .env_clear()
        .env("ADDR", "127.0.0.1")
        .env("AUTH_TOKEN", "t")
        .output()
        .expect("run autodeploy");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("PORT"), "{stderr}");
    assert!(stderr.contains("DEPLOY_SCRIPT"), "{stderr}");
}
