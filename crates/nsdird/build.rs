//! Build script: render the nsdird(8) man page for packaging.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
};
use time::{OffsetDateTime, format_description::well_known::Iso8601};

const FALLBACK_DATE: &str = "1970-01-01";

/// Reproducible page date from `SOURCE_DATE_EPOCH`.
fn manual_date() -> String {
    let Some(timestamp) = env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|raw| raw.parse::<i64>().ok())
    else {
        return FALLBACK_DATE.into();
    };
    OffsetDateTime::from_unix_timestamp(timestamp)
        .ok()
        .and_then(|date| date.format(&Iso8601::DATE).ok())
        .unwrap_or_else(|| {
            println!("cargo:warning=Ignoring invalid SOURCE_DATE_EPOCH; using {FALLBACK_DATE}");
            FALLBACK_DATE.into()
        })
}

/// `target/generated-man/<target>/<profile>`, derived from `OUT_DIR`.
fn man_dir() -> PathBuf {
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown-target".into());
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown-profile".into());
    // out -> {crate}-{hash} -> build -> {profile} -> target
    let base = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .and_then(|out| Some(out.parent()?.parent()?.parent()?.parent()?.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("target"));
    base.join("generated-man").join(target).join(profile)
}

fn write_page(contents: &str, dir: &Path, name: &str) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let tmp = dir.join(format!("{name}.tmp"));
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, dir.join(name))
}

fn render(binary: &str, version: &str, date: &str) -> String {
    let title = binary.to_uppercase();
    format!(
        ".TH \"{title}\" \"8\" \"{date}\" \"{binary} {version}\" \"System Administration\"\n\
.SH NAME\n\
{binary} \\- name service lookup daemon backed by a directory server\n\
.SH SYNOPSIS\n\
.B {binary}\n\
[\\fB\\-\\-config\\-path\\fR \\fIFILE\\fR]\n\
.SH DESCRIPTION\n\
{binary} answers passwd, group, host, service and other name service lookups\n\
from a directory server. Server URIs may be discovered from DNS SRV records\n\
and the search base derived from the default DNS domain.\n\
.SH SIGNALS\n\
.TP\n\
.B SIGHUP\n\
Re-run service discovery. A failed run keeps the current configuration.\n\
.TP\n\
.B SIGTERM, SIGINT, SIGQUIT\n\
Stop accepting connections and exit.\n\
.SH ENVIRONMENT\n\
Every option may be set through an \\fBNSDIR_\\fR prefixed variable, for\n\
example \\fBNSDIR_SRV_DOMAIN\\fR or \\fBNSDIR_LOG_FILTER\\fR.\n"
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
    println!("cargo:rerun-if-env-changed=TARGET");
    println!("cargo:rerun-if-env-changed=PROFILE");

    let binary = env::var("CARGO_BIN_NAME")
        .or_else(|_| env::var("CARGO_PKG_NAME"))
        .unwrap_or_else(|_| "nsdird".into());
    let version = env::var("CARGO_PKG_VERSION")
        .map_err(|_| "CARGO_PKG_VERSION must be set by Cargo to render the man page")?;

    let page = render(&binary, &version, &manual_date());
    let name = format!("{binary}.8");
    write_page(&page, &man_dir(), &name)?;

    if let Some(out_dir) = env::var_os("OUT_DIR").map(PathBuf::from) {
        if let Err(error) = write_page(&page, &out_dir, &name) {
            println!(
                "cargo:warning=Failed to stage man page in {}: {error}",
                out_dir.display()
            );
        }
    }
    Ok(())
}
