// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Playback rate of the page's video elements.

use overspeed_core::rate::PlaybackRate;
use wasm_bindgen::JsCast as _;
use web_sys::{Document, HtmlMediaElement};

/// The external rate, read from the first `video` element and written to all
/// of them.
#[derive(Clone, Debug)]
pub struct MediaRate {
    document: Document,
}

impl MediaRate {
    /// Creates a collaborator over the videos of `document`.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn videos(&self) -> impl Iterator<Item = HtmlMediaElement> {
        let list = self.document.query_selector_all("video").ok();
        let len = list.as_ref().map_or(0, web_sys::NodeList::length);
        (0..len).filter_map(move |i| {
            list.as_ref()?
                .get(i)?
                .dyn_into::<HtmlMediaElement>()
                .ok()
        })
    }
}

impl PlaybackRate for MediaRate {
    fn rate(&self) -> f64 {
        self.videos().next().map_or(1.0, |v| v.playback_rate())
    }

    fn set_rate(&mut self, rate: f64) {
        for video in self.videos() {
            video.set_playback_rate(rate);
        }
    }
}
