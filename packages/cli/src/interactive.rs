//! Menu-driven session against the backend.
//!
//! Every menu entry maps to one page action; the resulting notice is
//! printed with a style per [`NoticeKind`].

use console::style;
use dialoguer::{Confirm, Input, MultiSelect, Password, Select};
use indicatif::MultiProgress;
use realty_map_app::estimate::{COUNT_CHOICES, EstimateForm};
use realty_map_app::favorites::EMPTY_PLACEHOLDER;
use realty_map_app::locations::SelectOption;
use realty_map_app::map::NearbyView;
use realty_map_app::notice::{Notice, NoticeKind};
use realty_map_app::page::Page;
use realty_map_app::shell::{ClickTarget, Modal, Tab};
use realty_map_models::{AmenityKind, Credentials, Registration};

use crate::progress::with_spinner;
use crate::terminal_map::TerminalMap;

/// Top-level actions.
enum Action {
    SelectLocation,
    Estimate,
    SaveFavorite,
    Favorites,
    RemoveFavorite,
    Compare,
    Nearby,
    FocusPlace,
    ShowMap,
    Login,
    Register,
    Logout,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::SelectLocation,
        Self::Estimate,
        Self::SaveFavorite,
        Self::Favorites,
        Self::RemoveFavorite,
        Self::Compare,
        Self::Nearby,
        Self::FocusPlace,
        Self::ShowMap,
        Self::Login,
        Self::Register,
        Self::Logout,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::SelectLocation => "Select a location",
            Self::Estimate => "Estimate a price",
            Self::SaveFavorite => "Save estimate to favorites",
            Self::Favorites => "Show favorites",
            Self::RemoveFavorite => "Remove a favorite",
            Self::Compare => "Compare favorites",
            Self::Nearby => "Find nearby amenities",
            Self::FocusPlace => "Focus a nearby place",
            Self::ShowMap => "Show map",
            Self::Login => "Log in",
            Self::Register => "Register",
            Self::Logout => "Log out",
            Self::Quit => "Quit",
        }
    }
}

/// Prints a notice styled by its kind.
pub fn print_notice(notice: &Notice) {
    let message = notice.message.as_str();
    let styled = match notice.kind {
        NoticeKind::Success => style(message).green(),
        NoticeKind::Info => style(message).cyan(),
        NoticeKind::Empty | NoticeKind::Validation => style(message).yellow(),
        NoticeKind::AuthRequired => style(message).magenta().bold(),
        NoticeKind::Error => style(message).red().bold(),
    };
    println!("{styled}");
}

/// Switches to `tab` and prints its caption.
fn open_tab(page: &mut Page<TerminalMap>, tab: Tab) {
    page.activate_tab(tab);
    println!("{}", style(format!("== {} ==", tab.title())).bold());
}

/// Runs the menu until the user quits.
///
/// # Errors
///
/// Returns an error if a prompt fails (e.g. no terminal is attached).
pub async fn run(
    page: &mut Page<TerminalMap>,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    loop {
        println!();
        if let Some(user) = page.session().user() {
            println!("{}", style(format!("Logged in as {user}")).dim());
        }

        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        match Action::ALL[idx] {
            Action::SelectLocation => select_location(page, multi).await?,
            Action::Estimate => estimate(page, multi).await?,
            Action::SaveFavorite => {
                open_tab(page, Tab::Estimate);
                let notice = with_spinner(multi, "Saving...", page.save_favorite()).await;
                print_notice(&notice);
                prompt_login_if_required(page, multi).await?;
            }
            Action::Favorites => {
                open_tab(page, Tab::Favorites);
                let notice =
                    with_spinner(multi, "Loading favorites...", page.reload_favorites()).await;
                match notice.kind {
                    NoticeKind::Error | NoticeKind::AuthRequired => print_notice(&notice),
                    _ => print_favorites(page),
                }
                prompt_login_if_required(page, multi).await?;
            }
            Action::RemoveFavorite => remove_favorite(page, multi).await?,
            Action::Compare => compare(page)?,
            Action::Nearby => nearby(page, multi).await?,
            Action::FocusPlace => focus_place(page)?,
            Action::ShowMap => {
                open_tab(page, Tab::Map);
                print!("{}", page.map().widget());
            }
            Action::Login => login(page, multi).await?,
            Action::Register => register(page, multi).await?,
            Action::Logout => {
                let notice = with_spinner(multi, "Logging out...", page.logout()).await;
                print_notice(&notice);
            }
            Action::Quit => return Ok(()),
        }
    }
}

async fn select_location(
    page: &mut Page<TerminalMap>,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    open_tab(page, Tab::Map);

    let Some(name) = pick_location(page)? else {
        return Ok(());
    };

    let notice = with_spinner(multi, "Updating map...", page.select_location(&name)).await;
    print_notice(&notice);
    Ok(())
}

/// Splits selector entries into the placeholder caption and the entries
/// that can be chosen.
fn location_choices(options: Vec<SelectOption>) -> (String, Vec<SelectOption>) {
    let (placeholders, choices): (Vec<_>, Vec<_>) = options.into_iter().partition(|o| o.disabled);
    let prompt = placeholders
        .into_iter()
        .next()
        .map_or_else(|| "Location".to_string(), |o| o.label);
    (prompt, choices)
}

/// Lets the user pick one of the loaded locations.
fn pick_location(page: &Page<TerminalMap>) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let (prompt, choices) = location_choices(page.directory().options());
    if choices.is_empty() {
        print_notice(&Notice::empty(
            "No locations available. Please check the backend API!",
        ));
        return Ok(None);
    }

    let labels: Vec<&str> = choices.iter().map(|o| o.label.as_str()).collect();
    let idx = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(Some(choices[idx].value.clone()))
}

async fn estimate(
    page: &mut Page<TerminalMap>,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    open_tab(page, Tab::Estimate);

    let location = pick_location(page)?;

    let area: String = Input::new()
        .with_prompt("Area (Square Feet)")
        .allow_empty(true)
        .interact_text()?;

    let counts: Vec<String> = COUNT_CHOICES.map(|n| n.to_string()).collect();
    let rooms = Select::new()
        .with_prompt("BHK")
        .items(&counts)
        .default(1)
        .interact()?;
    let baths = Select::new()
        .with_prompt("Bathrooms")
        .items(&counts)
        .default(1)
        .interact()?;

    let property_age: String = Input::new()
        .with_prompt("Property age (years)")
        .default("0".to_string())
        .interact_text()?;

    let form = EstimateForm {
        location,
        area,
        rooms: counts[rooms].parse().ok(),
        baths: counts[baths].parse().ok(),
        property_age: Some(property_age),
    };

    let notice = with_spinner(multi, "Estimating...", page.estimate(&form)).await;
    print_notice(&notice);
    Ok(())
}

fn print_favorites(page: &Page<TerminalMap>) {
    if let Some(placeholder) = page.favorites().placeholder() {
        print_notice(&placeholder);
        return;
    }

    for card in page.favorites().cards() {
        println!(
            "#{} {} ({}) {}",
            card.id,
            style(&card.location).bold(),
            card.details.join(", "),
            style(&card.price).green()
        );
    }
}

/// Offers to log in when the last action opened the login dialog.
async fn prompt_login_if_required(
    page: &mut Page<TerminalMap>,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    if !page.modals().is_open(Modal::Auth) {
        return Ok(());
    }

    if Confirm::new()
        .with_prompt("Log in now?")
        .default(true)
        .interact()?
    {
        login(page, multi).await?;
    }

    page.click(Modal::Auth, ClickTarget::CloseButton);
    Ok(())
}

/// Lets the user pick one cached favorite.
fn pick_favorite(page: &Page<TerminalMap>) -> Result<Option<i64>, Box<dyn std::error::Error>> {
    let cards = page.favorites().cards();
    if cards.is_empty() {
        print_notice(&Notice::empty(EMPTY_PLACEHOLDER));
        return Ok(None);
    }

    let labels: Vec<String> = cards
        .iter()
        .map(|c| format!("{} ({})", c.location, c.price))
        .collect();
    let idx = Select::new()
        .with_prompt("Favorite")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(Some(cards[idx].id))
}

async fn remove_favorite(
    page: &mut Page<TerminalMap>,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    open_tab(page, Tab::Favorites);

    let Some(id) = pick_favorite(page)? else {
        return Ok(());
    };

    if !Confirm::new()
        .with_prompt("Remove this property from favorites?")
        .default(false)
        .interact()?
    {
        return Ok(());
    }

    let notice = with_spinner(multi, "Removing...", page.remove_favorite(id)).await;
    print_notice(&notice);
    print_favorites(page);
    Ok(())
}

fn compare(page: &mut Page<TerminalMap>) -> Result<(), Box<dyn std::error::Error>> {
    open_tab(page, Tab::Favorites);

    let cards = page.favorites().cards();
    let labels: Vec<String> = cards
        .iter()
        .map(|c| format!("{} ({})", c.location, c.price))
        .collect();

    let selected = if labels.is_empty() {
        Vec::new()
    } else {
        MultiSelect::new()
            .with_prompt("Select 2 to 4 properties")
            .items(&labels)
            .interact()?
    };
    let ids: Vec<i64> = selected.into_iter().map(|i| cards[i].id).collect();

    let notice = page.compare(&ids);
    if page.modals().is_open(Modal::Compare) {
        if let Some(table) = page.comparison() {
            println!();
            print!("{table}");
            println!("{}", style("* best value (lowest price per sqft)").green());
        }
        page.click(Modal::Compare, ClickTarget::CloseButton);
    } else {
        print_notice(&notice);
    }
    Ok(())
}

async fn nearby(
    page: &mut Page<TerminalMap>,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    open_tab(page, Tab::Map);

    let labels: Vec<String> = AmenityKind::KNOWN.iter().map(ToString::to_string).collect();
    let idx = Select::new()
        .with_prompt("Amenity type")
        .items(&labels)
        .default(0)
        .interact()?;
    let kind = AmenityKind::KNOWN[idx].clone();

    let notice = with_spinner(
        multi,
        &format!("Searching for nearby {kind}s..."),
        page.show_nearby(kind),
    )
    .await;
    print_notice(&notice);

    if let NearbyView::Places(_, cards) = page.map().nearby_view() {
        for (i, card) in cards.iter().enumerate() {
            let distance = card.distance.as_deref().unwrap_or("-");
            println!("{:>3}. {} ({}) {distance}", i + 1, card.name, card.kind);
        }
    }
    Ok(())
}

fn focus_place(page: &mut Page<TerminalMap>) -> Result<(), Box<dyn std::error::Error>> {
    open_tab(page, Tab::Map);

    let NearbyView::Places(_, cards) = page.map().nearby_view() else {
        print_notice(&page.map().nearby_view().to_notice());
        return Ok(());
    };
    let labels: Vec<String> = cards.iter().map(|c| c.name.clone()).collect();

    let idx = Select::new()
        .with_prompt("Place")
        .items(&labels)
        .default(0)
        .interact()?;

    match page.focus_place(idx) {
        Ok(place) => println!("Focused on {} at {}", place.name, place.coordinates),
        Err(notice) => print_notice(&notice),
    }
    Ok(())
}

async fn login(
    page: &mut Page<TerminalMap>,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let email: String = Input::new().with_prompt("Email").interact_text()?;
    let password = Password::new().with_prompt("Password").interact()?;

    let notice = with_spinner(
        multi,
        "Logging in...",
        page.login(&Credentials { email, password }),
    )
    .await;
    print_notice(&notice);
    Ok(())
}

async fn register(
    page: &mut Page<TerminalMap>,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let name: String = Input::new().with_prompt("Name").interact_text()?;
    let email: String = Input::new().with_prompt("Email").interact_text()?;
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;

    let notice = with_spinner(
        multi,
        "Registering...",
        page.register(&Registration {
            name,
            email,
            password,
        }),
    )
    .await;
    print_notice(&notice);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(label: &str, disabled: bool) -> SelectOption {
        SelectOption {
            value: if disabled { String::new() } else { label.to_string() },
            label: label.to_string(),
            disabled,
        }
    }

    #[test]
    fn placeholder_becomes_prompt() {
        let (prompt, choices) = location_choices(vec![
            option("Select Location", true),
            option("Hebbal", false),
            option("Whitefield", false),
        ]);

        assert_eq!(prompt, "Select Location");
        let values: Vec<&str> = choices.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, ["Hebbal", "Whitefield"]);
    }

    #[test]
    fn only_placeholder_leaves_nothing_to_pick() {
        let (_, choices) = location_choices(vec![option("Select Location", true)]);
        assert!(choices.is_empty());
    }
}
