use super::*;

#[test]
fn parses_scrape_command() {
    let cli = Cli::try_parse_from([
        "replyscope-cli",
        "scrape",
        "--url",
        "https://x.com/a/status/1",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Scrape { ref url } if url == "https://x.com/a/status/1"
    ));
}

#[test]
fn parses_analyze_command_without_url() {
    let cli = Cli::try_parse_from(["replyscope-cli", "analyze", "--input", "replies.json"])
        .expect("expected valid cli args");

    match cli.command {
        Commands::Analyze { input, url } => {
            assert_eq!(input, PathBuf::from("replies.json"));
            assert!(url.is_none());
        }
        other @ Commands::Scrape { .. } => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_analyze_command_with_url() {
    let cli = Cli::try_parse_from([
        "replyscope-cli",
        "analyze",
        "--input",
        "replies.json",
        "--url",
        "https://x.com/a/status/1",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Analyze { url: Some(ref u), .. } if u == "https://x.com/a/status/1"
    ));
}

#[test]
fn scrape_requires_url() {
    assert!(Cli::try_parse_from(["replyscope-cli", "scrape"]).is_err());
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["replyscope-cli"]).is_err());
}
