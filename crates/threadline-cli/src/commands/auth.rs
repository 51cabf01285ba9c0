use anyhow::Result;

use crate::app::AppBootstrap;

pub async fn login(
    app: &AppBootstrap,
    phone: &str,
    code: &str,
    country: Option<&str>,
    remember: bool,
) -> Result<()> {
    let mut flow = app.login_flow();
    if let Err(e) = flow.load_countries().await {
        anyhow::bail!("Could not load countries: {}", e);
    }
    if let Some(cca2) = country {
        flow.select_country(cca2)?;
    }
    flow.set_phone_number(phone);

    flow.request_code().await?;
    println!("Verification code sent to {}", flow.full_phone_number());

    flow.verify(code, remember).await?;
    if remember {
        println!("Logged in.");
    } else {
        println!("Logged in for this process only (use without --no-remember to stay logged in).");
    }
    Ok(())
}

pub fn logout(app: &AppBootstrap) -> Result<()> {
    app.auth.logout()?;
    println!("Logged out.");
    Ok(())
}
