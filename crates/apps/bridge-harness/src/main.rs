mod config;

use clap::Parser;
use config::HarnessConfig;
use engage_bridge::{
    BridgeDispatcher, CancelToken, FilePreferenceStore, MethodCall, MethodResponse,
    PreferenceStore, PushMessage, PushMessageHandler, ResultSink,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use test_support::{FakeHostPlatform, FakeVendorSdk, InMemoryPreferenceStore};

/// Interactive bridge harness. Reads one request per stdin line and prints
/// one response per line, so channel scenarios can be replayed from a file:
///
///   {"method":"getPlatformVersion"}
///   {"method":"setAlias","args":["driver-7"]}
///   @push {"p":"{\"alert\":\"hi\"}"}
///   @permission 190 android.permission.POST_NOTIFICATIONS true
#[derive(Parser, Debug)]
#[command(name = "bridge-harness", about = "Engage bridge scenario harness", version)]
struct Cli {
    /// TOML scenario file describing the fake device and optional engage call.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = match &cli.config {
        Some(path) => HarnessConfig::load(path)?,
        None => HarnessConfig::default(),
    };

    let sdk = Arc::new(FakeVendorSdk::new());
    let platform = Arc::new(FakeHostPlatform::with_api_level(config.platform.api_level));
    platform.set_os_release(&config.platform.os_release);
    for permission in &config.platform.granted_permissions {
        platform.grant(permission);
    }
    for permission in &config.platform.rationale_permissions {
        platform.set_show_rationale(permission, true);
    }
    if let Some(token) = &config.platform.push_token {
        platform.set_push_token(token);
    }

    let prefs: Arc<dyn PreferenceStore> = match &config.prefs_path {
        Some(path) => Arc::new(FilePreferenceStore::new(path)),
        None => Arc::new(InMemoryPreferenceStore::new()),
    };

    let dispatcher = BridgeDispatcher::new(sdk.clone(), platform, prefs);
    let receiver = PushMessageHandler::new(sdk);

    if let Some(engage) = &config.engage {
        let call = MethodCall::new(
            "engage",
            vec![
                json!(engage.sdk_key),
                json!(engage.server_index().map_err(|err| err.to_string())?),
                json!(engage.app_id),
                json!(engage.tenant_id),
                json!(engage.notification_mode_index().map_err(|err| err.to_string())?),
            ],
        );
        dispatcher.handle_call(&call, print_sink());
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.map_err(|err| format!("read stdin: {err}"))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(directive) = line.strip_prefix('@') {
            apply_directive(&dispatcher, &receiver, directive)?;
            continue;
        }
        let call: MethodCall =
            serde_json::from_str(line).map_err(|err| format!("parse request: {err}"))?;
        dispatcher.handle_call(&call, print_sink());
    }
    Ok(())
}

fn print_sink() -> ResultSink {
    ResultSink::new(|response: MethodResponse| match serde_json::to_string(&response) {
        Ok(serialized) => println!("{serialized}"),
        Err(err) => eprintln!("error: serialize response: {err}"),
    })
}

/// Out-of-band platform events the channel itself cannot carry.
fn apply_directive(
    dispatcher: &BridgeDispatcher,
    receiver: &PushMessageHandler,
    directive: &str,
) -> Result<(), String> {
    let (name, rest) = match directive.split_once(' ') {
        Some((name, rest)) => (name, rest.trim()),
        None => (directive, ""),
    };
    match name {
        "push" => {
            let data: BTreeMap<String, String> =
                serde_json::from_str(rest).map_err(|err| format!("parse push payload: {err}"))?;
            let message = PushMessage::new(data);
            if PushMessageHandler::can_handle(&message) {
                receiver.handle(&message, &CancelToken::new());
                eprintln!("push: delegated to sdk");
            } else {
                eprintln!("push: not ours, left to the application");
            }
            Ok(())
        }
        "token" => {
            if rest.is_empty() {
                return Err("token directive needs a value".to_string());
            }
            receiver.on_new_token(rest, &CancelToken::new());
            eprintln!("token: forwarded");
            Ok(())
        }
        "permission" => {
            let mut parts = rest.split_whitespace();
            let code: u32 = parts
                .next()
                .and_then(|raw| raw.parse().ok())
                .ok_or_else(|| "permission directive needs a request code".to_string())?;
            let permission = parts
                .next()
                .ok_or_else(|| "permission directive needs a permission name".to_string())?;
            let granted: bool = parts
                .next()
                .and_then(|raw| raw.parse().ok())
                .ok_or_else(|| "permission directive needs true or false".to_string())?;
            let matched =
                dispatcher.on_permission_result(code, &[(permission.to_string(), granted)]);
            if !matched {
                eprintln!("permission: no negotiation waiting on code {code}");
            }
            Ok(())
        }
        other => Err(format!("unknown directive '@{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value as JsonValue;

    fn parse_call(line: &str) -> MethodCall {
        serde_json::from_str(line).expect("request line")
    }

    #[test]
    fn request_lines_round_trip_through_the_dispatcher() {
        let sdk = Arc::new(FakeVendorSdk::new());
        let platform = Arc::new(FakeHostPlatform::new());
        let dispatcher = BridgeDispatcher::new(
            sdk,
            platform,
            Arc::new(InMemoryPreferenceStore::new()),
        );
        let (sink, captured) = test_support::capture_sink();
        dispatcher.handle_call(&parse_call(r#"{"method":"getPlatformVersion"}"#), sink);
        let response = captured.take().expect("response");
        assert_eq!(response.result, Some(JsonValue::String("Android 14".to_string())));
    }

    #[test]
    fn push_directive_requires_a_json_object() {
        let sdk = Arc::new(FakeVendorSdk::new());
        let dispatcher = BridgeDispatcher::new(
            sdk.clone(),
            Arc::new(FakeHostPlatform::new()),
            Arc::new(InMemoryPreferenceStore::new()),
        );
        let receiver = PushMessageHandler::new(sdk);
        assert!(apply_directive(&dispatcher, &receiver, "push not-json").is_err());
        assert!(apply_directive(&dispatcher, &receiver, r#"push {"p":"{}"}"#).is_ok());
    }

    #[test]
    fn unknown_directives_are_rejected() {
        let sdk = Arc::new(FakeVendorSdk::new());
        let dispatcher = BridgeDispatcher::new(
            sdk.clone(),
            Arc::new(FakeHostPlatform::new()),
            Arc::new(InMemoryPreferenceStore::new()),
        );
        let receiver = PushMessageHandler::new(sdk);
        assert!(apply_directive(&dispatcher, &receiver, "reboot").is_err());
    }
}
