use anyhow::Result;

use crate::app::AppBootstrap;

pub async fn list(app: &AppBootstrap) -> Result<()> {
    let mut flow = app.login_flow();
    flow.load_countries().await?;

    let selected = flow.selected_country().map(|c| c.cca2.clone());
    for country in flow.countries() {
        let marker = if selected.as_deref() == Some(country.cca2.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{} {}  {:<8} {}",
            marker,
            country.cca2,
            country.calling_code(),
            country.display_name()
        );
    }
    Ok(())
}
