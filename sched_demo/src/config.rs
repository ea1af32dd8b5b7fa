// runtime configuration (discipline, workload)
use anyhow::Result;
use clap::Parser;
use jobsched::Discipline;

#[derive(Debug, Clone)]
pub struct Config {
    pub discipline: Discipline,
    pub random: usize,
    pub max_delay_ms: u64,
    pub millis: Vec<u64>,
}

#[derive(Parser, Debug, Clone)]
#[command(about = "exercise the job scheduler: odd args schedule, even args sleep")]
pub struct Cli {
    /// which coordinator to use: locking or channel
    #[arg(short = 's', long, default_value = "locking")] pub discipline: String,
    /// schedule N jobs with random delays instead of walking the arg list
    #[arg(long, default_value_t = 0)]                    pub random: usize,
    /// upper bound for random delays
    #[arg(long, default_value_t = 500)]                  pub max_delay_ms: u64,
    /// alternating schedule/sleep intervals in milliseconds
    pub millis: Vec<String>,
}

impl Cli {
    pub fn parse_and_build_config() -> Result<Config> {
        let c = <Cli as Parser>::parse();
        let discipline = match c.discipline.as_str() {
            "locking" => Discipline::Locking,
            "channel" => Discipline::Channel,
            other => anyhow::bail!("unknown discipline {other:?} (want locking or channel)"),
        };
        // malformed interval values are skipped, not fatal
        let millis = c.millis.iter().filter_map(|s| s.parse().ok()).collect();
        Ok(Config {
            discipline,
            random: c.random,
            max_delay_ms: c.max_delay_ms.max(1),
            millis,
        })
    }
}
