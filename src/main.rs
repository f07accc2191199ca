//! 应用程序入口 (Application Entrypoint)
//!
//! 负责 CLI 指令解析、遥测层初始化、配置加载与订阅输出。

mod core;
mod engine;
mod interfaces;
mod network;
mod utils;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::core::config::AppConfig;
use crate::core::error::{ErrorKind, SubError};
use crate::core::request::SubscribeQuery;
use crate::interfaces::TextFetcher;
use crate::network::{HttpFetcher, TopIpFetcher};

/// 命令行界面脚手架 (CLI Scaffolding)
#[derive(Parser)]
#[command(author, version, about = "Generate VLESS/VMess subscriptions from address lists", long_about = None)]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 生成订阅
    Generate(GenerateArgs),
    /// 输出解析后的地址条目 (JSON Lines)
    Parse {
        /// 原始地址文本，缺省时从上游抓取
        #[arg(short, long)]
        addresses: Option<String>,
        #[arg(short = 'f', long, conflicts_with = "addresses")]
        addresses_file: Option<PathBuf>,
    },
    /// 抓取优选 IP 排行接口并输出地址行
    TopIps {
        #[arg(short, long)]
        url: String,
    },
    /// 生成随机 UUID
    Uuid,
}

#[derive(Args)]
struct GenerateArgs {
    /// 完整查询串 (host=..&uuid=..)，与单独的参数互斥
    #[arg(short, long, conflicts_with_all = ["host", "uuid", "path", "sni", "transport", "format", "template"])]
    query: Option<String>,
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    uuid: Option<String>,
    #[arg(long)]
    path: Option<String>,
    #[arg(long)]
    sni: Option<String>,
    /// ws / tcp / http
    #[arg(short, long)]
    transport: Option<String>,
    /// vless / vmess
    #[arg(long)]
    format: Option<String>,
    /// 模板链接，提供时进入模板模式
    #[arg(long)]
    template: Option<String>,
    /// 原始地址文本，缺省时从上游抓取
    #[arg(short, long)]
    addresses: Option<String>,
    #[arg(short = 'f', long, conflicts_with = "addresses")]
    addresses_file: Option<PathBuf>,
    /// 输出明文链接而非 Base64
    #[arg(long)]
    plain: bool,
}

impl GenerateArgs {
    fn to_query(&self) -> anyhow::Result<SubscribeQuery> {
        if let Some(qs) = &self.query {
            return SubscribeQuery::from_query(qs).context("Invalid query string");
        }
        Ok(SubscribeQuery {
            host: self.host.clone(),
            uuid: self.uuid.clone(),
            path: self.path.clone(),
            sni: self.sni.clone(),
            transport: self.transport.clone(),
            format: self.format.clone(),
            mode: self.template.as_ref().map(|_| "template".to_string()),
            template_link: self.template.clone(),
            ..Default::default()
        })
    }
}

#[tokio::main]
async fn main() {
    // 遥测层初始化 (Telemetry Layer Initialization)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

/// 按错误类别区分退出码
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<SubError>().map(SubError::kind) {
        Some(ErrorKind::Validation) => 2,
        Some(ErrorKind::Decode) => 3,
        Some(ErrorKind::Upstream) => 4,
        Some(ErrorKind::Internal) | None => 1,
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    match cli.command {
        Commands::Generate(args) => {
            let request = args.to_query()?.resolve(config.alpn())?;
            let raw = load_addresses(&config, args.addresses, args.addresses_file).await?;
            let subscription = engine::build(&request, &raw)?;

            if args.plain {
                print!("{}", subscription.plain());
            } else {
                println!("{}", subscription.body());
            }
        }
        Commands::Parse {
            addresses,
            addresses_file,
        } => {
            let raw = load_addresses(&config, addresses, addresses_file).await?;
            for record in engine::address::parse(&raw) {
                println!("{}", serde_json::to_string(&record)?);
            }
        }
        Commands::TopIps { url } => {
            let fetcher = TopIpFetcher::new(HttpFetcher::new(&config.upstream)?, config.top_ip_port);
            println!("{}", fetcher.fetch_text(&url).await?);
        }
        Commands::Uuid => println!("{}", utils::random_uuid()),
    }

    Ok(())
}

/// 显式文本 > 文件 > 上游抓取 (含兜底)
async fn load_addresses(
    config: &AppConfig,
    text: Option<String>,
    file: Option<PathBuf>,
) -> anyhow::Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()));
    }

    let fetcher = HttpFetcher::new(&config.upstream)?;
    Ok(network::resolve_addresses(config, &fetcher).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::TemplateIssue;

    #[test]
    fn test_exit_code_per_error_kind() {
        let cases = [
            (SubError::Validation("missing host".into()), 2),
            (SubError::InvalidTemplate(TemplateIssue::UndecodablePayload), 3),
            (SubError::InvalidTemplate(TemplateIssue::MissingHost), 2),
            (SubError::upstream("https://a", "HTTP 500"), 4),
            (SubError::Io(std::io::Error::other("disk")), 1),
        ];
        for (err, code) in cases {
            let kind = err.kind();
            assert_eq!(exit_code(&anyhow::Error::new(err)), code, "{:?}", kind);
        }
    }

    #[test]
    fn test_exit_code_sees_through_context() {
        let err = anyhow::Error::new(SubError::upstream("https://a", "HTTP 502")).context("Failed to fetch");
        assert_eq!(exit_code(&err), 4);

        let wrapped: anyhow::Result<()> =
            Err(SubError::Validation("bad".into())).context("Invalid query string");
        assert_eq!(exit_code(&wrapped.unwrap_err()), 2);

        assert_eq!(exit_code(&anyhow::anyhow!("plain failure")), 1);
    }
}
