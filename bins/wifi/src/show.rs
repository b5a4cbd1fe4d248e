//! Show commands for interfaces, BSS and station info.

use std::io::{self, Write};

use wlink::output::{OutputFormat, OutputOptions, print_all, print_one};
use wlink::{Backend, Client, Error, Interface, Result};

/// Print every wireless interface.
pub async fn interfaces<B: Backend>(
    client: &Client<B>,
    format: OutputFormat,
    opts: &OutputOptions,
) -> Result<()> {
    let interfaces = client.interfaces().await?;
    let mut out = io::stdout().lock();
    print_all(&mut out, &interfaces, format, opts)?;
    out.flush()?;
    Ok(())
}

/// Print the BSS of interface `name`.
pub async fn bss<B: Backend>(
    client: &Client<B>,
    name: &str,
    format: OutputFormat,
    opts: &OutputOptions,
) -> Result<()> {
    let ifi = find_interface(client, name).await?;
    let bss = client.bss(&ifi).await?;
    let mut out = io::stdout().lock();
    print_one(&mut out, &bss, format, opts)?;
    out.flush()?;
    Ok(())
}

/// Print the peer statistics of station interface `name`.
pub async fn station<B: Backend>(
    client: &Client<B>,
    name: &str,
    format: OutputFormat,
    opts: &OutputOptions,
) -> Result<()> {
    let ifi = find_interface(client, name).await?;
    let sta = client.station_info(&ifi).await?;
    let mut out = io::stdout().lock();
    print_one(&mut out, &sta, format, opts)?;
    out.flush()?;
    Ok(())
}

async fn find_interface<B: Backend>(client: &Client<B>, name: &str) -> Result<Interface> {
    client
        .interfaces()
        .await?
        .into_iter()
        .find(|ifi| ifi.name == name)
        .ok_or_else(|| Error::InterfaceNotFound {
            name: name.to_string(),
        })
}
