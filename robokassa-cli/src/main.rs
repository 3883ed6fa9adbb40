//! Robokassa merchant tool
//!
//! Prints signed payment links and checks callback signatures for a shop
//! configured in a TOML file.

mod config;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use config::ConfigLoader;
use robokassa_sdk::objects::Culture;
use robokassa_sdk::params::{USER_PARAMETER_PREFIX, is_user_parameter};
use robokassa_sdk::{CallbackPayload, Invoice, Robokassa};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Robokassa merchant tool - sign payment requests and verify callbacks
#[derive(Parser, Debug)]
#[command(name = "robokassa")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "ROBOKASSA_CONFIG", default_value = "./robokassa.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the payment page URL for a new invoice
    PaymentUrl(InvoiceArgs),
    /// Verify a ResultURL notification and print the expected response body
    VerifyResult(CallbackArgs),
    /// Verify a SuccessURL redirect
    VerifySuccess(CallbackArgs),
}

#[derive(clap::Args, Debug)]
struct InvoiceArgs {
    /// Amount, e.g. 123.45
    #[arg(long)]
    out_sum: String,

    /// Shop invoice number (omit to let Robokassa assign one)
    #[arg(long)]
    inv_id: Option<u64>,

    /// Purchase description shown to the buyer
    #[arg(long)]
    description: String,

    #[arg(long)]
    email: Option<String>,

    #[arg(long, value_enum)]
    culture: Option<CultureArg>,

    #[arg(long)]
    user_ip: Option<String>,

    /// Preferred payment method
    #[arg(long)]
    inc_curr_label: Option<String>,

    /// Invoice lifetime in hours
    #[arg(long)]
    expires_in_hours: Option<i64>,

    /// File holding the receipt JSON, signed exactly as stored
    #[arg(long)]
    receipt_file: Option<PathBuf>,

    /// Parent invoice of a recurring charge
    #[arg(long)]
    previous_inv_id: Option<u64>,

    /// Extra parameter, repeatable: --shp login=vasya
    #[arg(long = "shp", value_parser = parse_key_value)]
    user_parameters: Vec<(String, String)>,

    /// Print the form body instead of the URL
    #[arg(long)]
    form: bool,
}

#[derive(clap::Args, Debug)]
struct CallbackArgs {
    /// OutSum exactly as received
    #[arg(long)]
    out_sum: String,

    #[arg(long)]
    inv_id: Option<String>,

    /// SignatureValue as received
    #[arg(long)]
    signature: String,

    /// Extra parameter as received, repeatable: --shp Shp_login=vasya (prefix optional)
    #[arg(long = "shp", value_parser = parse_key_value)]
    user_parameters: Vec<(String, String)>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CultureArg {
    En,
    Ru,
}

impl From<CultureArg> for Culture {
    fn from(value: CultureArg) -> Self {
        match value {
            CultureArg::En => Culture::En,
            CultureArg::Ru => Culture::Ru,
        }
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))?;
    Ok((key.to_string(), value.to_string()))
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let merchant = ConfigLoader::new(&args.config).load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!(
        "Configuration loaded from {:?} (merchant {}, {})",
        args.config,
        merchant.merchant_login,
        merchant.hash_algorithm
    );
    let client = Robokassa::new(merchant);

    match args.command {
        Command::PaymentUrl(invoice_args) => print_payment_request(&client, invoice_args),
        Command::VerifyResult(callback_args) => {
            let payload = callback_payload(callback_args)?;
            if !client.verify_result(&payload) {
                anyhow::bail!("ResultURL signature does not verify");
            }
            println!("{}", payload.result_response());
            Ok(())
        }
        Command::VerifySuccess(callback_args) => {
            let payload = callback_payload(callback_args)?;
            if !client.verify_success(&payload) {
                anyhow::bail!("SuccessURL signature does not verify");
            }
            println!("verified");
            Ok(())
        }
    }
}

fn print_payment_request(client: &Robokassa, args: InvoiceArgs) -> anyhow::Result<()> {
    let mut builder = Invoice::builder(args.out_sum, args.description)
        .user_parameters(args.user_parameters);
    if let Some(inv_id) = args.inv_id {
        builder = builder.inv_id(inv_id);
    }
    if let Some(previous) = args.previous_inv_id {
        builder = builder.previous_invoice_id(previous);
    }
    if let Some(email) = args.email {
        builder = builder.email(email);
    }
    if let Some(culture) = args.culture {
        builder = builder.culture(culture.into());
    }
    if let Some(user_ip) = args.user_ip {
        builder = builder.user_ip(user_ip);
    }
    if let Some(label) = args.inc_curr_label {
        builder = builder.inc_curr_label(label);
    }
    if let Some(hours) = args.expires_in_hours {
        let expires_at = hours
            .checked_mul(3600)
            .map(time::Duration::seconds)
            .and_then(|lifetime| time::OffsetDateTime::now_utc().checked_add(lifetime))
            .with_context(|| format!("--expires-in-hours {hours} is out of range"))?;
        builder = builder.expiration_date(expires_at);
    }
    if let Some(path) = args.receipt_file {
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read receipt from {}", path.display()))?;
        builder = builder.receipt_json(json.trim_end());
    }

    let invoice = builder.build().context("invalid invoice")?;
    if args.form {
        println!("{}", client.form_body(&invoice));
    } else {
        println!("{}", client.payment_url(&invoice)?);
    }
    Ok(())
}

fn callback_payload(args: CallbackArgs) -> anyhow::Result<CallbackPayload> {
    let mut fields = vec![
        ("OutSum".to_string(), args.out_sum),
        ("SignatureValue".to_string(), args.signature),
    ];
    if let Some(inv_id) = args.inv_id {
        fields.push(("InvId".to_string(), inv_id));
    }
    fields.extend(args.user_parameters.into_iter().map(|(key, value)| {
        if is_user_parameter(&key) {
            (key, value)
        } else {
            (format!("{USER_PARAMETER_PREFIX}{key}"), value)
        }
    }));
    CallbackPayload::from_request(fields).context("malformed callback")
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("login=vasya").unwrap(),
            ("login".to_string(), "vasya".to_string())
        );
        assert_eq!(
            parse_key_value("url=https://x.io/?a=b").unwrap(),
            ("url".to_string(), "https://x.io/?a=b".to_string())
        );
        assert!(parse_key_value("novalue").is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_payment_url_args() {
        let args = Args::try_parse_from([
            "robokassa",
            "payment-url",
            "--out-sum",
            "100",
            "--inv-id",
            "7",
            "--description",
            "Order 7",
            "--shp",
            "login=vasya",
            "--culture",
            "ru",
        ])
        .unwrap();
        let Command::PaymentUrl(invoice) = args.command else {
            panic!("expected payment-url");
        };
        assert_eq!(invoice.inv_id, Some(7));
        assert_eq!(invoice.user_parameters, vec![("login".to_string(), "vasya".to_string())]);
        assert!(matches!(invoice.culture, Some(CultureArg::Ru)));
    }

    #[test]
    fn test_callback_payload_from_args() {
        let payload = callback_payload(CallbackArgs {
            out_sum: "100.00".to_string(),
            inv_id: Some("7".to_string()),
            signature: "abc".to_string(),
            user_parameters: vec![("Shp_login".to_string(), "vasya".to_string())],
        })
        .unwrap();
        assert_eq!(payload.result_response(), "OK7");
        assert_eq!(payload.user_parameters().count(), 1);
    }

    #[test]
    fn test_callback_parameters_get_the_prefix() {
        let payload = callback_payload(CallbackArgs {
            out_sum: "100.00".to_string(),
            inv_id: Some("7".to_string()),
            signature: "abc".to_string(),
            user_parameters: vec![
                ("login".to_string(), "vasya".to_string()),
                ("SHP_order".to_string(), "42".to_string()),
            ],
        })
        .unwrap();
        let params: Vec<_> = payload.user_parameters().collect();
        assert_eq!(params, vec![("shp_login", "vasya"), ("SHP_order", "42")]);
    }

    #[test]
    fn test_callback_verifies_with_bare_parameter_names() {
        use robokassa_sdk::{MerchantConfig, SecretPair};

        let client = Robokassa::new(MerchantConfig::new("demo", SecretPair::new("pass1", "pass2")));
        let invoice = Invoice::builder("100", "Order 7")
            .inv_id(7)
            .user_parameter("login", "vasya")
            .build()
            .unwrap();
        let payload = callback_payload(CallbackArgs {
            out_sum: invoice.out_sum().to_string(),
            inv_id: Some("7".to_string()),
            signature: client.signature(&invoice),
            user_parameters: vec![("login".to_string(), "vasya".to_string())],
        })
        .unwrap();
        assert!(client.verify_success(&payload));
    }

    #[test]
    fn test_expiry_overflow_is_an_error() {
        use robokassa_sdk::{MerchantConfig, SecretPair};

        let client = Robokassa::new(MerchantConfig::new("demo", SecretPair::new("pass1", "pass2")));
        let hours = i64::MAX.to_string();
        let args = Args::try_parse_from([
            "robokassa",
            "payment-url",
            "--out-sum",
            "1",
            "--description",
            "x",
            "--expires-in-hours",
            hours.as_str(),
        ])
        .unwrap();
        let Command::PaymentUrl(invoice) = args.command else {
            panic!("expected payment-url");
        };
        let err = print_payment_request(&client, invoice).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }
}
