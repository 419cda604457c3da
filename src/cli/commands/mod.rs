use anyhow::Result;

pub mod categories;
pub mod config;
pub mod search;
pub mod wizard;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

pub async fn show_how_to_start() -> Result<()> {
    println!("🛍️  wc-admin - Customize Store & Marketplace");
    println!();
    println!("Wizard:");
    println!("  🧭 wc-admin wizard --path /customize-store/design-with-ai   # Where does a URL land?");
    println!("  ▶️  wc-admin wizard -e DESIGN_WITH_AI -e THEME_SUGGESTED     # Replay events");
    println!();
    println!("Marketplace:");
    println!("  🗂️  wc-admin categories    # Category selector");
    println!("  🔎 wc-admin search --term shipping");
    println!();
    println!("  ⚙️  wc-admin config        # Effective configuration");
    println!();
    println!("💡 Add --offline to the wizard command to run without a store");
    Ok(())
}
