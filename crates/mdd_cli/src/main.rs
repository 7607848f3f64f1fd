use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use mdd_core::{
    catalog::{self, filter_dir, installed_path, metadata_path},
    consts::DEFAULT_FP_RATE,
    scan::{add_hash_list, calculate_hashes, count_files, count_hash_list, lookup_hashes},
    BloomFilter, Catalog, Config, FilterMeta, FilterStore, FsStore, HashAlg, Verdict,
};

mod remote;
use remote::RemoteRepo;

#[derive(Parser)]
#[command(name = "mdd", about = "Known-file Bloom filters over file digests")]
struct Cli {
    /// Directory holding config.json, installed.json and filters/
    #[arg(long, env = "MDD_HOME", default_value = ".", global = true)]
    home: PathBuf,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(ValueEnum, Clone, Copy)]
enum CliHashAlg {
    Md5,
    Sha1,
    Sha256,
}

impl From<CliHashAlg> for HashAlg {
    fn from(a: CliHashAlg) -> Self {
        match a {
            CliHashAlg::Md5 => HashAlg::Md5,
            CliHashAlg::Sha1 => HashAlg::Sha1,
            CliHashAlg::Sha256 => HashAlg::Sha256,
        }
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// Hash every file under the given paths into a new filter
    Calculate {
        filter: PathBuf,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long, default_value_t = DEFAULT_FP_RATE)]
        fp_rate: f64,
        #[arg(long, value_enum, default_value_t = CliHashAlg::Md5)]
        digest: CliHashAlg,
    },

    /// Build a filter from files listing one MD5 per line
    Fromfile {
        filter: PathBuf,
        #[arg(required = true)]
        hash_files: Vec<PathBuf>,
        #[arg(long, default_value_t = DEFAULT_FP_RATE)]
        fp_rate: f64,
    },

    /// Report whether each file's digest is in the filter
    Lookup {
        filter: PathBuf,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long, value_enum, default_value_t = CliHashAlg::Md5)]
        digest: CliHashAlg,
    },

    Info {
        filter: PathBuf,
    },

    Filters {
        #[command(subcommand)]
        cmd: FiltersCmd,
    },
}

#[derive(Subcommand)]
enum FiltersCmd {
    /// Installed filters, or `remote` / a repository URL for a remote catalog
    List { source: Option<String> },
    Fetch { name: String },
    Update,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn writable_store(filter: &Path) -> Result<(FsStore, String)> {
    let (store, name) = FsStore::for_path(filter)?;
    store
        .check_writable()
        .with_context(|| format!("unable to open {} for writing", filter.display()))?;
    Ok((store, name))
}

fn open_filter(filter: &Path) -> Result<BloomFilter> {
    let (store, name) = FsStore::for_path(filter)?;
    let mut r = store
        .reader(&name)
        .with_context(|| format!("unable to open {} for reading", filter.display()))?;
    BloomFilter::read_from(&mut r).with_context(|| format!("loading {}", filter.display()))
}

fn save_filter(bf: &BloomFilter, store: &FsStore, name: &str, filter: &Path) -> Result<()> {
    println!("[+] Saving {} filter to outfile: {}", bf.byte_size_human(), filter.display());
    bf.save_to(store, name).with_context(|| format!("saving {}", filter.display()))?;
    Ok(())
}

/// Downloads `name`, checks it against the published digest and records it.
async fn install(
    repo: &RemoteRepo,
    home: &Path,
    name: &str,
    meta: &FilterMeta,
    alg: HashAlg,
    installed: &mut Catalog,
) -> Result<()> {
    println!("Fetching {name}...");
    let bytes = repo.download(name).await.with_context(|| format!("{name} filter not found"))?;
    let dir = filter_dir(home);
    std::fs::create_dir_all(&dir)?;
    catalog::publish_filter(&FsStore::new(&dir), name, &bytes, meta, alg, installed)?;
    Ok(())
}

async fn remote_catalog(home: &Path, repo: &RemoteRepo) -> Result<Catalog> {
    let (raw, cat) = repo.metadata().await?;
    std::fs::write(metadata_path(home), raw)?;
    Ok(cat)
}

async fn run_filters(home: &Path, cmd: FiltersCmd) -> Result<()> {
    let cfg = Config::load_or_init(home)?;
    match cmd {
        FiltersCmd::List { source: None } => {
            let cat = catalog::installed(home, cfg.hash_alg)?;
            print!("{}", cat.render_table());
        }
        FiltersCmd::List { source: Some(src) } => {
            let base = if src == "remote" { cfg.repo.clone() } else { src };
            let repo = RemoteRepo::new(base)?;
            let cat = remote_catalog(home, &repo).await?;
            print!("{}", cat.render_table());
        }
        FiltersCmd::Fetch { name } => {
            if catalog::is_installed(home, &name, cfg.hash_alg)? {
                println!("{name} is already installed");
                return Ok(());
            }
            let repo = RemoteRepo::new(cfg.repo.clone())?;
            let remote = remote_catalog(home, &repo).await?;
            let meta = remote
                .get(&name)
                .cloned()
                .ok_or_else(|| anyhow!("{name} filter not found"))?;
            let mut installed = catalog::installed(home, cfg.hash_alg)?;
            install(&repo, home, &name, &meta, cfg.hash_alg, &mut installed).await?;
            installed.save_atomic(&installed_path(home))?;
        }
        FiltersCmd::Update => {
            let repo = RemoteRepo::new(cfg.repo.clone())?;
            let remote = remote_catalog(home, &repo).await?;
            let mut installed = catalog::installed(home, cfg.hash_alg)?;
            let stale = catalog::stale_entries(&installed, &remote, cfg.hash_alg);
            if stale.is_empty() {
                println!("all filters up to date");
                return Ok(());
            }
            for name in &stale {
                if let Some(meta) = remote.get(name).cloned() {
                    install(&repo, home, name, &meta, cfg.hash_alg, &mut installed).await?;
                }
            }
            installed.save_atomic(&installed_path(home))?;
            println!("updated {} filter(s)", stale.len());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Cmd::Calculate { filter, paths, fp_rate, digest } => {
            let (store, name) = writable_store(&filter)?;
            println!("[+] Counting files. This may take a while");
            let mut count = 0u64;
            for p in &paths {
                count += count_files(p).with_context(|| format!("counting files in {}", p.display()))?;
            }
            println!("Counted {count} files.");

            let mut bf = BloomFilter::new(count, fp_rate).context("sizing filter")?;
            println!("[+] Calculating hashes.");
            for p in &paths {
                for rec in calculate_hashes(&mut bf, p, digest.into())? {
                    match rec.digest {
                        Some(d) => println!("  {}    {}", rec.path.display(), d),
                        None => println!("  {}    Permission Denied", rec.path.display()),
                    }
                }
            }
            save_filter(&bf, &store, &name, &filter)?;
            println!("    estimated accuracy: {:.2}%", bf.accuracy(count));
            println!("[+] Done.");
        }
        Cmd::Fromfile { filter, hash_files, fp_rate } => {
            let (store, name) = writable_store(&filter)?;
            println!("[+] Counting hashes in {}", join_paths(&hash_files));
            let mut count = 0u64;
            for f in &hash_files {
                count += count_hash_list(f).with_context(|| format!("reading {}", f.display()))?;
            }
            println!("    Counted {count} hashes.");

            let mut bf = BloomFilter::new(count, fp_rate).context("sizing filter")?;
            println!("[+] Adding hashes from {}", join_paths(&hash_files));
            for f in &hash_files {
                add_hash_list(&mut bf, f)?;
            }
            save_filter(&bf, &store, &name, &filter)?;
            println!("[+] Done.");
        }
        Cmd::Lookup { filter, paths, digest } => {
            let bf = open_filter(&filter)?;
            for p in &paths {
                for rec in lookup_hashes(&bf, p, digest.into())? {
                    match rec.verdict {
                        Verdict::InFilter => println!("{} is in filter", rec.path.display()),
                        Verdict::NotInFilter => println!("{} is not in filter", rec.path.display()),
                        Verdict::Unreadable => println!("{}: Permission Denied", rec.path.display()),
                    }
                }
            }
        }
        Cmd::Info { filter } => {
            let bf = open_filter(&filter)?;
            let ones = bf.bits().count_ones();
            println!("filter    : {}", filter.display());
            println!("size      : {} bits", bf.size());
            println!("hashes    : {}", bf.hash_count());
            println!("bytes     : {} ({})", bf.byte_size(), bf.byte_size_human());
            println!("set bits  : {} ({:.2}%)", ones, ones as f64 * 100.0 / bf.size() as f64);
        }
        Cmd::Filters { cmd } => run_filters(&cli.home, cmd).await?,
    }
    Ok(())
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
}
