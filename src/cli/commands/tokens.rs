use clap::{Arg, Command};

pub fn with_args(command: Command) -> Command {
    let command = with_token_args(command);
    with_vault_args(command)
}

fn with_token_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("access-token-secret")
                .long("access-token-secret")
                .help("Signing secret for access tokens")
                .env("TENAUTH_ACCESS_TOKEN_SECRET")
                .required(true),
        )
        .arg(
            Arg::new("access-token-ttl-seconds")
                .long("access-token-ttl-seconds")
                .help("Access token TTL in seconds")
                .env("TENAUTH_ACCESS_TOKEN_TTL_SECONDS")
                .default_value("900")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("refresh-token-secret")
                .long("refresh-token-secret")
                .help("Signing secret for refresh tokens")
                .env("TENAUTH_REFRESH_TOKEN_SECRET")
                .required(true),
        )
        .arg(
            Arg::new("refresh-token-ttl-seconds")
                .long("refresh-token-ttl-seconds")
                .help("Refresh token TTL in seconds")
                .env("TENAUTH_REFRESH_TOKEN_TTL_SECONDS")
                .default_value("2592000")
                .value_parser(clap::value_parser!(u64)),
        )
}

fn with_vault_args(command: Command) -> Command {
    command.arg(
        Arg::new("secret-hash-cost")
            .long("secret-hash-cost")
            .help("bcrypt work factor for project secrets and passwords")
            .env("TENAUTH_SECRET_HASH_COST")
            .default_value("10")
            .value_parser(clap::value_parser!(u32)),
    )
}
