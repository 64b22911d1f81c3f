//! Terminal rendering of hero, archive grid, and detail views.

use console::style;

use apod_explorer::gallery::{ArchiveStatus, ArchiveStore, DetailMedia, DetailView};
use apod_explorer::hero::{HeroMedia, HeroView};

pub fn hero(view: &HeroView) {
    let badge = view.badge();
    if view.is_signal_lost() {
        println!("{}", style(badge).red().bold());
    } else {
        println!("{}", style(badge).dim());
    }
    println!("{}", style(view.title()).bold());
    if let Some(copyright) = view.item().and_then(|item| item.display_copyright()) {
        println!("{}", style(format!("© {}", copyright)).dim());
    }
    println!();
    println!("{}", view.explanation());
    println!();

    match view.media() {
        HeroMedia::Image(url) => println!("{} {}", style("image").cyan(), url),
        HeroMedia::Embed(url) => println!("{} {}", style("video").magenta(), url),
        HeroMedia::Static => {}
    }

    match view.download() {
        Some(action) => println!("[{}] {}", view.download_label(), action.filename),
        None => println!("{}", style(format!("[{}]", view.download_label())).dim()),
    }
}

pub fn archive(store: &ArchiveStore) {
    println!("{}", style("Mission Archive").bold());
    println!("{}", style(store.stats().summary()).dim());
    println!();

    if store.status() == ArchiveStatus::Pending {
        println!("{}", style("No entries received yet.").dim());
    }

    for item in store.visible() {
        let tag = if item.media_type.is_image() {
            String::new()
        } else {
            style(format!(" {} ", item.media_type.as_str().to_uppercase()))
                .magenta()
                .to_string()
        };
        println!("{}{}  {}", style(item.date_key()).blue(), tag, item.title);
    }

    if let Some(label) = store.footer().label() {
        println!();
        println!("{}", style(format!("── {} ──", label)).dim());
    }
}

pub fn detail(view: &DetailView) {
    println!("{}", style(view.date).blue().bold());
    println!("{}", style(&view.title).bold());
    if let Some(copyright) = &view.copyright {
        println!("{}", style(format!("© {}", copyright)).dim());
    }
    println!();
    println!("{}", view.explanation);
    println!();

    match &view.media {
        DetailMedia::Image { src, .. } => println!("{} {}", style("image").cyan(), src),
        DetailMedia::Embed { src } => println!("{} {}", style("video").magenta(), src),
    }
    println!("View High-Res Source: {}", view.source_url);
}
