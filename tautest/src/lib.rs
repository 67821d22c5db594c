//! Command-line front end for `tautest-core`: one request, validated, reported.

use std::process::ExitCode;

use tautest_core::http::{
    Http, HttpHeader, HttpMethod, RequestBody, RequestSpec, ValidationOutcome,
};
use tautest_core::{equal, Expected, Value};

mod cli;
mod config;
mod output;
mod transport;

pub use cli::{Cli, Command, ConfigCommand, ReadArgs, WriteArgs};
pub use config::{
    apply_overrides, build_header, default_tautest_toml, load_config, parse_header,
    parse_json_arg, TautestConfig, TransportSettings,
};
pub use output::ConsoleSink;
pub use transport::ReqwestTransport;

use output::{error_exit, report_outcome};

/// Request and checks described by one request subcommand.
#[derive(Debug)]
struct Invocation {
    spec: RequestSpec,
    expect: Option<Expected>,
    status: Option<u16>,
}

pub fn run(cli: Cli) -> ExitCode {
    if let Command::Config {
        command: ConfigCommand::Default,
    } = &cli.command
    {
        print!("{}", default_tautest_toml());
        return ExitCode::SUCCESS;
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(message) => return error_exit(&message, cli.json),
    };
    let header = match build_header(&config.headers, &cli.headers) {
        Ok(header) => header,
        Err(message) => return error_exit(&message, cli.json),
    };
    let invocation = match build_invocation(&cli.command, header) {
        Ok(invocation) => invocation,
        Err(message) => return error_exit(&message, cli.json),
    };
    let transport = match ReqwestTransport::new(config.transport.timeout_ms) {
        Ok(transport) => transport,
        Err(error) => return error_exit(&error.to_string(), cli.json),
    };

    let settings = apply_overrides(config.http, &cli);
    let http = Http::new(transport)
        .with_settings(settings)
        .with_report_sink(ConsoleSink);

    let Invocation {
        spec,
        expect,
        status,
    } = invocation;
    let outcome = http.execute(spec, move |header, body| -> ValidationOutcome<Value> {
        if let Some(status) = status {
            header.get("statusCode").should(equal(status))?;
        }
        if let Some(expected) = expect {
            body.should(equal(expected))?;
        }
        Ok(body.extract())
    });

    report_outcome(&outcome, http.last_validation_result().as_ref(), cli.json)
}

fn build_invocation(command: &Command, header: HttpHeader) -> Result<Invocation, String> {
    let (method, url, body, expect, status) = match command {
        Command::Get(args) => (HttpMethod::Get, &args.url, None, &args.expect, args.status),
        Command::Delete(args) => (HttpMethod::Delete, &args.url, None, &args.expect, args.status),
        Command::Post(args) => write_parts(HttpMethod::Post, args),
        Command::Put(args) => write_parts(HttpMethod::Put, args),
        Command::Patch(args) => write_parts(HttpMethod::Patch, args),
        Command::Config { .. } => return Err("config commands send no request".to_string()),
    };

    let mut spec = RequestSpec::new(method, url.clone()).with_header(header);
    if let Some(raw) = body {
        spec = spec.with_body(RequestBody::json(parse_json_arg("--body", raw)?));
    }
    let expect = expect
        .as_deref()
        .map(|raw| parse_json_arg("--expect", raw).map(Expected::from))
        .transpose()?;
    Ok(Invocation {
        spec,
        expect,
        status,
    })
}

type CommandParts<'a> = (
    HttpMethod,
    &'a String,
    Option<&'a str>,
    &'a Option<String>,
    Option<u16>,
);

fn write_parts(method: HttpMethod, args: &WriteArgs) -> CommandParts<'_> {
    (
        method,
        &args.url,
        args.body.as_deref(),
        &args.expect,
        args.status,
    )
}
