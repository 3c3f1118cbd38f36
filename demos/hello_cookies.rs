use cookie_manager::cookies::{CookieParams, CookieStore, DocumentCookieJar, Lifetime};
use serde_json::json;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // The jar stands in for `document.cookie`. Every store that gets a clone of
    // the handle sees the same cookies.
    let jar = DocumentCookieJar::new().into_handle();

    // Defaults come from a loose configuration object. Unknown keys are ignored.
    let config = json!({
        "path": "/",
        "lifetime": "7d",
        "secure": false,
        "sameSite": "lax",
    });
    let store = CookieStore::from_config(jar.clone(), Some(&config))?;

    store.add(&CookieParams::named("session").value("abc 123 & more"))?;
    store.add(&CookieParams::named("theme").value("dark").lifetime("30m"))?;
    store.add(&CookieParams::named("visits").value("1").lifetime(Lifetime::Millis(60_000)))?;

    println!("directive: {}", store.build_cookie_string(&CookieParams::named("preview").value("x")));
    println!("raw jar:   {}", jar.read().unwrap_or_else(std::sync::PoisonError::into_inner).read());

    let mut cookies: Vec<_> = store.get_cookies().into_iter().collect();
    cookies.sort();
    for (name, value) in cookies {
        println!("{name:>8} = {value}");
    }

    store.remove("theme", Some("/"))?;
    match store.get_cookie("theme") {
        Some(value) => println!("theme is still set to {value}"),
        None => println!("theme removed"),
    }

    for lifetime in ["30s", "2h", "3M", "10000", "3D", "text"] {
        println!("{lifetime:>6} -> {} ms", store.parse_lifetime(&Lifetime::from(lifetime)));
    }

    Ok(())
}
