//! Interactive menu driving the trade flows over any line-based input/output

use super::ui;
use crate::core::quote::QUOTE_VALIDITY_SECS;
use crate::core::{
    Catalog, CurrencyDescriptor, FxError, PortfolioStore, Quote, RateProvider, Session, Trader,
};
use anyhow::{Result, bail};
use comfy_table::Cell;
use std::io::{BufRead, Write};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    NewUser,
    ShowPortfolio,
    ShowRates,
    BuyFx,
    SellFx,
    Logout,
    Exit,
}

/// One selectable entry: a single alphanumeric selector and its description.
#[derive(Debug, Clone)]
pub struct MenuOption {
    selector: char,
    description: String,
    action: Action,
}

impl MenuOption {
    pub fn new(selector: &str, description: &str, action: Action) -> Result<Self> {
        let selector = selector.trim().to_lowercase();
        let mut chars = selector.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            bail!("Selector must be one character long: {selector}");
        };
        if !c.is_alphanumeric() {
            bail!("Selector must be alphanumeric: {selector}");
        }
        let description = description.trim();
        if description.is_empty() {
            bail!("Description must not be empty");
        }
        Ok(Self {
            selector: c,
            description: description.to_string(),
            action,
        })
    }
}

pub struct Menu {
    options: Vec<MenuOption>,
}

impl Menu {
    pub fn new(options: Vec<MenuOption>) -> Result<Self> {
        for (i, option) in options.iter().enumerate() {
            if options[..i].iter().any(|o| o.selector == option.selector) {
                bail!("Selector already in menu options: {}", option.selector);
            }
        }
        Ok(Self { options })
    }

    /// The action for `input`, if it names one of the selectors.
    pub fn select(&self, input: &str) -> Option<Action> {
        let input = input.trim().to_lowercase();
        let mut chars = input.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self
                .options
                .iter()
                .find(|o| o.selector == c)
                .map(|o| o.action),
            _ => None,
        }
    }

    pub fn render(&self) -> String {
        self.options
            .iter()
            .map(|o| format!("{}. {}\n", o.selector, o.description))
            .collect()
    }
}

fn main_menu(logged_in: bool) -> Result<Menu> {
    let mut options = if logged_in {
        vec![
            MenuOption::new("1", "Show portfolio", Action::ShowPortfolio)?,
            MenuOption::new("2", "Show rates", Action::ShowRates)?,
            MenuOption::new("3", "Buy FX", Action::BuyFx)?,
            MenuOption::new("4", "Sell FX", Action::SellFx)?,
            MenuOption::new("5", "Logout", Action::Logout)?,
        ]
    } else {
        vec![
            MenuOption::new("1", "Login", Action::Login)?,
            MenuOption::new("2", "New User", Action::NewUser)?,
        ]
    };
    options.push(MenuOption::new("x", "Exit", Action::Exit)?);
    Menu::new(options)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Buy,
    Sell,
}

pub struct App<'a, R, W> {
    catalog: &'a Catalog,
    store: &'a dyn PortfolioStore,
    rates: &'a dyn RateProvider,
    input: R,
    output: W,
    session: Option<Session>,
}

impl<'a, R: BufRead, W: Write> App<'a, R, W> {
    pub fn new(
        catalog: &'a Catalog,
        store: &'a dyn PortfolioStore,
        rates: &'a dyn RateProvider,
        input: R,
        output: W,
    ) -> Self {
        Self {
            catalog,
            store,
            rates,
            input,
            output,
            session: None,
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    fn trader(&self) -> Trader<'a> {
        Trader::new(self.catalog, self.store, self.rates)
    }

    /// Runs the main menu until the user exits or input ends.
    pub async fn run(&mut self) -> Result<()> {
        writeln!(self.output, "Welcome to fx-trader!")?;
        loop {
            let menu = main_menu(self.session.is_some())?;
            let marker = self
                .session
                .as_ref()
                .map(|s| format!(" [{}]", s.username()))
                .unwrap_or_default();
            writeln!(self.output)?;
            let title = format!(">>> Main Menu{marker}");
            writeln!(self.output, "{}", ui::style_text(&title, ui::StyleType::Title))?;
            write!(self.output, "{}", menu.render())?;

            let action = loop {
                let Some(selection) = self.prompt("   > ")? else {
                    return self.close();
                };
                if let Some(action) = menu.select(&selection) {
                    break action;
                }
            };

            match action {
                Action::Login => self.login()?,
                Action::NewUser => self.new_user()?,
                Action::ShowPortfolio => self.show_portfolio()?,
                Action::ShowRates => self.show_rates().await?,
                Action::BuyFx => self.trade(Side::Buy).await?,
                Action::SellFx => self.trade(Side::Sell).await?,
                Action::Logout => self.logout()?,
                Action::Exit => return self.close(),
            }
        }
    }

    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Like `prompt`, but a blank answer (or end of input) cancels.
    fn prompt_or_abort(&mut self, text: &str, what: &str) -> Result<Option<String>> {
        match self.prompt(text)? {
            Some(answer) if !answer.is_empty() => Ok(Some(answer)),
            _ => {
                writeln!(self.output, "Aborting: Blank {what}.")?;
                Ok(None)
            }
        }
    }

    fn heading(&mut self, title: &str) -> Result<()> {
        writeln!(self.output)?;
        let title = format!(">>> {title}");
        writeln!(self.output, "{}", ui::style_text(&title, ui::StyleType::Title))?;
        Ok(())
    }

    fn say_error(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", ui::style_text(message, ui::StyleType::Error))?;
        Ok(())
    }

    fn report(&mut self, e: &FxError) -> Result<()> {
        error!(error = %e, "Operation failed");
        let message = match e {
            FxError::RateUnavailable { .. } => "Error getting FX rates.".to_string(),
            FxError::StorageUnavailable(_) => "Error accessing portfolio.".to_string(),
            FxError::SettlementFailed(_) => "Error executing transaction.".to_string(),
            other => other.to_string(),
        };
        self.say_error(&message)
    }

    fn login(&mut self) -> Result<()> {
        self.heading("Login")?;
        writeln!(self.output, "Enter username. Enter blank value to cancel.")?;
        loop {
            let Some(name) = self.prompt_or_abort("Username: ", "username")? else {
                return Ok(());
            };
            let session = match Session::new(&name) {
                Ok(session) => session,
                Err(e) => {
                    self.say_error(&e.to_string())?;
                    continue;
                }
            };
            match self.store.portfolio_exists(&session) {
                Ok(true) => {
                    writeln!(self.output, "Logged in as {}", session.username())?;
                    info!(user = session.username(), "Logged in");
                    self.session = Some(session);
                    return Ok(());
                }
                Ok(false) => self.say_error("No such user. Try again.")?,
                Err(e) => return self.report(&e),
            }
        }
    }

    fn new_user(&mut self) -> Result<()> {
        self.heading("Create New User")?;
        writeln!(self.output, "Enter username. Enter blank value to cancel.")?;
        loop {
            let Some(name) = self.prompt_or_abort("Username: ", "username")? else {
                return Ok(());
            };
            let session = match Session::new(&name) {
                Ok(session) => session,
                Err(e) => {
                    self.say_error(&e.to_string())?;
                    continue;
                }
            };
            match self.store.create_portfolio(&session, self.catalog) {
                Ok(()) => {
                    writeln!(self.output, "User {} created!", session.username())?;
                    info!(user = session.username(), "User created");
                    return Ok(());
                }
                Err(FxError::PortfolioExists(_)) => self.say_error("User already exists.")?,
                Err(e) => return self.report(&e),
            }
        }
    }

    fn logout(&mut self) -> Result<()> {
        if let Some(session) = self.session.take() {
            writeln!(self.output)?;
            writeln!(self.output, "Logged out of {}", session.username())?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "Goodbye!")?;
        Ok(())
    }

    pub fn show_portfolio(&mut self) -> Result<()> {
        let Some(session) = self.session.clone() else {
            return Ok(());
        };
        self.heading(&format!("Portfolio [{}]", session.username()))?;
        let balances = match self.store.portfolio(&session, self.catalog) {
            Ok(balances) => balances,
            Err(e) => return self.report(&e),
        };

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Currency"),
            ui::header_cell("Symbol"),
            ui::header_cell("Quantity"),
        ]);
        for balance in balances {
            let currency = balance.currency();
            table.add_row(vec![
                Cell::new(currency.code),
                Cell::new(currency.symbol),
                ui::amount_cell(balance),
            ]);
        }
        writeln!(self.output, "{table}")?;
        Ok(())
    }

    pub async fn show_rates(&mut self) -> Result<()> {
        self.heading("Show Rates")?;
        let spinner = ui::new_spinner("Fetching rates...");
        let result = self.rates.get_rates_cached().await;
        spinner.finish_and_clear();

        let rates = match result {
            Ok(rates) => rates,
            Err(e) => {
                error!(error = %e, "Failed to fetch rates");
                return self.say_error("Error getting FX rates.");
            }
        };

        writeln!(self.output, "1 {} =", self.catalog.base_currency().code)?;
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Currency"), ui::header_cell("Rate")]);
        for (code, rate) in &rates {
            table.add_row(vec![Cell::new(code), ui::amount_cell(rate)]);
        }
        writeln!(self.output, "{table}")?;
        Ok(())
    }

    fn choose_fx(&mut self, prompt: &str) -> Result<Option<CurrencyDescriptor>> {
        loop {
            let Some(code) = self.prompt_or_abort(prompt, "currency")? else {
                return Ok(None);
            };
            match self.catalog.resolve_fx(&code) {
                Ok(currency) => return Ok(Some(currency)),
                Err(_) => self.say_error("Invalid currency. Try again.")?,
            }
        }
    }

    async fn trade(&mut self, side: Side) -> Result<()> {
        let Some(session) = self.session.clone() else {
            return Ok(());
        };
        let (title, verb) = match side {
            Side::Buy => ("Buy FX", "buy"),
            Side::Sell => ("Sell FX", "sell"),
        };
        self.heading(title)?;
        writeln!(self.output, "Enter FX to {verb}. Enter blank value to cancel.")?;
        writeln!(self.output, "{}", self.catalog.fx_codes().join(", "))?;

        let Some(fx) = self.choose_fx(&format!("FX to {verb}: "))? else {
            return Ok(());
        };
        let paying = match side {
            Side::Buy => self.catalog.base_currency(),
            Side::Sell => fx,
        };

        let trader = self.trader();
        let balance = match trader.balance(&session, paying) {
            Ok(balance) => balance,
            Err(e) => return self.report(&e),
        };
        writeln!(self.output, "Balance: {} {}", paying.code, balance)?;
        if !balance.is_positive() {
            return self.say_error("Insufficient funds.");
        }

        let prompt = match side {
            Side::Buy => format!("Quantity to spend: {} ", paying.code),
            Side::Sell => format!("Quantity to sell: {} ", paying.code),
        };
        let quote = loop {
            let Some(raw) = self.prompt_or_abort(&prompt, "quantity")? else {
                return Ok(());
            };
            let quoted = match side {
                Side::Buy => trader.quote_buy(&session, fx, &raw).await,
                Side::Sell => trader.quote_sell(&session, fx, &raw).await,
            };
            match quoted {
                Ok(quote) => break quote,
                Err(FxError::InvalidQuantityString { .. }) => {
                    self.say_error("Invalid quantity. Try again.")?
                }
                Err(FxError::InsufficientFunds { .. }) => {
                    self.say_error("Insufficient funds. Try again.")?
                }
                Err(e) => return self.report(&e),
            }
        };

        self.confirm(&session, quote)
    }

    /// Asks for confirmation. Expiry is checked after the answer arrives, so a
    /// late "y" still fails.
    fn confirm(&mut self, session: &Session, quote: Quote) -> Result<()> {
        writeln!(self.output, "Quote valid for {QUOTE_VALIDITY_SECS} seconds:")?;
        writeln!(self.output, "{quote}")?;
        loop {
            let answer = self.prompt("Confirm (y/n): ")?.map(|a| a.to_lowercase());
            if quote.is_expired() {
                return self.say_error("Quote expired. Try again.");
            }
            match answer.as_deref() {
                Some("y") => {
                    return match self.trader().execute(session, quote) {
                        Ok(settlement) => {
                            writeln!(
                                self.output,
                                "{}",
                                ui::style_text("Confirmed!", ui::StyleType::Success)
                            )?;
                            writeln!(
                                self.output,
                                "{}",
                                ui::style_text(
                                    &format!(
                                        "New balances: {} {}, {} {}",
                                        settlement.bought.currency().code,
                                        settlement.bought,
                                        settlement.sold.currency().code,
                                        settlement.sold
                                    ),
                                    ui::StyleType::Subtle
                                )
                            )?;
                            Ok(())
                        }
                        Err(FxError::QuoteExpired(_)) => self.say_error("Quote expired. Try again."),
                        Err(e) => self.report(&e),
                    };
                }
                Some("n") | None => {
                    let state = quote.decline();
                    info!(%state, "Quote declined");
                    writeln!(self.output, "Trade aborted.")?;
                    return Ok(());
                }
                Some(_) => continue,
            }
        }
    }
}
