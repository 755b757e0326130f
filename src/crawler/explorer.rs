//! Dynamic interaction explorer
//!
//! Drives every `<select>` control on a rendered page through each of its real
//! options, capturing the content and links each choice reveals. Failures are
//! contained to the option (or control) that caused them.

use crate::browser::{BrowserSession, NavigationWait};
use crate::config::ExtractionConfig;
use crate::crawler::content::extract_base_content;
use crate::crawler::parser::{find_select_controls, parse_html, SelectControl};
use crate::storage::{DynamicState, ElementInfo, ElementType};
use crate::url::normalize_url;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Settings for one page's exploration
#[derive(Debug, Clone)]
pub struct ExploreSettings<'a> {
    pub extraction: &'a ExtractionConfig,
    /// Pause after each selection so the page can react
    pub settle_delay: Duration,
    /// Timeout for returning to the page after an unexpected navigation
    pub return_timeout: Duration,
}

/// Everything captured by exploring one page
#[derive(Debug, Clone, Default)]
pub struct Exploration {
    pub states: Vec<DynamicState>,
    /// Links that were not present in the page before any interaction
    pub links: Vec<String>,
}

enum ControlOutcome {
    Completed,
    /// The page navigated away and we returned to it
    Abandoned,
    /// The page navigated away and could not be restored
    PageLost,
}

/// Exercises each select control on the page loaded in `session`
///
/// # Arguments
///
/// * `session` - Browser session currently showing `page_url`
/// * `page_url` - Where the session actually landed (after redirects); used to
///   detect navigation away from the page and to resolve revealed links
/// * `html` - Rendered HTML of the page before interaction
/// * `settings` - Extraction rules and delays
///
/// # Returns
///
/// One `DynamicState` per (control, option) that was successfully selected,
/// plus newly revealed links in discovery order.
pub async fn explore(
    session: &mut dyn BrowserSession,
    page_url: &Url,
    html: &str,
    settings: &ExploreSettings<'_>,
) -> Exploration {
    let controls = find_select_controls(html, &settings.extraction.placeholder_option_values);
    let mut exploration = Exploration::default();
    if controls.is_empty() {
        return exploration;
    }

    info!(
        "Exploring {} select control(s) on {}",
        controls.len(),
        page_url
    );

    let mut seen_links: HashSet<String> = parse_html(html, page_url).links.into_iter().collect();

    for control in &controls {
        match explore_control(session, page_url, control, settings, &mut seen_links, &mut exploration)
            .await
        {
            ControlOutcome::Completed | ControlOutcome::Abandoned => {}
            ControlOutcome::PageLost => {
                warn!("Stopping exploration of {}: page could not be restored", page_url);
                break;
            }
        }
    }

    exploration
}

async fn explore_control(
    session: &mut dyn BrowserSession,
    page_url: &Url,
    control: &SelectControl,
    settings: &ExploreSettings<'_>,
    seen_links: &mut HashSet<String>,
    exploration: &mut Exploration,
) -> ControlOutcome {
    let selector = control.selector();

    for option in &control.options {
        if let Err(e) = session.select_option(&selector, &option.value).await {
            warn!(
                "Could not select '{}' in {} on {}: {}",
                option.value, selector, page_url, e
            );
            continue;
        }

        if !settings.settle_delay.is_zero() {
            tokio::time::sleep(settings.settle_delay).await;
        }

        if navigated_away(session, page_url).await {
            warn!(
                "Selecting '{}' in {} navigated away from {}; skipping control",
                option.value, selector, page_url
            );
            return match session
                .navigate(page_url, NavigationWait::Committed, settings.return_timeout)
                .await
            {
                Ok(()) => ControlOutcome::Abandoned,
                Err(e) => {
                    warn!("Could not return to {}: {}", page_url, e);
                    ControlOutcome::PageLost
                }
            };
        }

        let html = match session.content().await {
            Ok(html) => html,
            Err(e) => {
                warn!("Could not read {} after selecting '{}': {}", page_url, option.value, e);
                continue;
            }
        };

        let content = extract_base_content(&html, settings.extraction);
        for link in parse_html(&html, page_url).links {
            if seen_links.insert(link.clone()) {
                debug!("Option '{}' revealed {}", option.value, link);
                exploration.links.push(link);
            }
        }

        exploration.states.push(DynamicState {
            element_type: ElementType::Select,
            element_info: ElementInfo {
                name: control.name.clone().unwrap_or_default(),
                id: control.id.clone().unwrap_or_default(),
                option_value: option.value.clone(),
                option_text: option.text.clone(),
            },
            content,
        });
    }

    ControlOutcome::Completed
}

/// True if the session now shows a different page than `page_url`
async fn navigated_away(session: &mut dyn BrowserSession, page_url: &Url) -> bool {
    let current = match session.current_url().await {
        Ok(Some(current)) => current,
        _ => return false,
    };

    match (normalize_url(&current), normalize_url(page_url.as_str())) {
        (Ok(current), Ok(expected)) => current != expected,
        _ => current != page_url.as_str(),
    }
}
