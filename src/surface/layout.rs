//! Block placement for the content surface.
//!
//! Sections are laid out top to bottom inside `padding` on both sides. A
//! single cursor (`y`) moves down as elements are appended; the surface
//! height is wherever the cursor ends plus the bottom padding. Text is
//! wrapped greedily on word boundaries with the shared typeface, so the
//! rasterizer paints exactly the lines measured here.

use super::sections::{Section, category_title, plan_sections};
use super::{Block, ContentSurface, LinkCode, MediaBox, Rect, SectionKind, SurfaceStyle, TextRun};
use crate::media::MediaManifest;
use crate::model::{ContentModel, EquipmentItem, HouseRule, MediaKind, NearbyPlace, non_empty};
use crate::raster::typeface::Typeface;

const HEADER_HEIGHT: f32 = 96.0;
const LOGO_SIZE: f32 = 48.0;
const BRAND_SIZE: f32 = 22.0;
const TITLE_SIZE: f32 = 34.0;
const HEADING_SIZE: f32 = 26.0;
const SUBHEADING_SIZE: f32 = 20.0;
const BODY_SIZE: f32 = 17.0;
const CAPTION_SIZE: f32 = 14.0;

/// Vertical space after each element of a section.
const ELEMENT_GAP: f32 = 20.0;
const CARD_PADDING: f32 = 16.0;
const LINK_CODE_SIZE: f32 = 160.0;
/// Light margin around the code, about four modules at typical sizes.
const LINK_CODE_QUIET_ZONE: f32 = 12.0;
const LINK_CODE_DARK: [u8; 3] = [0, 0, 0];
const LINK_CODE_LIGHT: [u8; 3] = [255, 255, 255];
const AVATAR_SIZE: f32 = 64.0;
const PHOTO_RATIO: f32 = 9.0 / 16.0;
const MAP_RATIO: f32 = 0.36;
const GALLERY_COLUMNS: usize = 2;
const GALLERY_GUTTER: f32 = 24.0;
const PLACE_PHOTO_RATIO: f32 = 0.6;

/// Lay out every present section of `model`.
pub fn build_surface(
    model: &ContentModel,
    style: &SurfaceStyle,
    typeface: &dyn Typeface,
) -> ContentSurface {
    let sections = plan_sections(model);
    let mut layout = Layout::new(style, typeface);

    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            layout.y += style.section_gap as f32;
        }
        match section {
            Section::Welcome => layout.welcome(model),
            Section::GettingHere => layout.getting_here(model),
            Section::CheckIn => layout.check_in(model),
            Section::WifiAccess(item) => layout.wifi_access(item),
            Section::HouseManual(items) => layout.house_manual(items),
            Section::CheckOut => layout.check_out(model),
            Section::Nearby(category, places) => layout.nearby(category.title(), places),
        }
    }

    let kinds = sections.iter().map(Section::kind).collect();
    layout.finish(kinds)
}

/// Greedy word wrap of `text` into lines no wider than `width`.
///
/// Explicit newlines start a new paragraph. A word wider than the whole
/// line is broken between characters.
pub fn wrap_text(typeface: &dyn Typeface, text: &str, size: f32, width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if typeface.measure(&candidate, size) <= width {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if typeface.measure(word, size) <= width {
                line = word.to_string();
            } else {
                let mut pieces = break_word(typeface, word, size, width);
                line = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }
        lines.push(line);
    }
    lines
}

fn break_word(typeface: &dyn Typeface, word: &str, size: f32, width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    for c in word.chars() {
        piece.push(c);
        if typeface.measure(&piece, size) > width && piece.chars().count() > 1 {
            piece.pop();
            pieces.push(std::mem::take(&mut piece));
            piece.push(c);
        }
    }
    pieces.push(piece);
    pieces
}

struct Layout<'a> {
    style: &'a SurfaceStyle,
    typeface: &'a dyn Typeface,
    blocks: Vec<Block>,
    media: MediaManifest,
    y: f32,
}

/// Where a card started, so its background can be inserted under its content.
struct CardStart {
    block_index: usize,
    top: f32,
}

impl<'a> Layout<'a> {
    fn new(style: &'a SurfaceStyle, typeface: &'a dyn Typeface) -> Self {
        Self {
            style,
            typeface,
            blocks: Vec::new(),
            media: MediaManifest::default(),
            y: 0.0,
        }
    }

    fn finish(self, sections: Vec<SectionKind>) -> ContentSurface {
        let height = (self.y + self.style.padding as f32).ceil().max(1.0) as u32;
        ContentSurface {
            width: self.style.width,
            height,
            background: self.style.palette.background,
            placeholder: self.style.palette.card,
            blocks: self.blocks,
            sections,
            media: self.media,
        }
    }

    fn left(&self) -> f32 {
        self.style.padding as f32
    }

    fn content_width(&self) -> f32 {
        self.style.width as f32 - 2.0 * self.style.padding as f32
    }

    // ------------------------------------------------------------------------
    // Primitives
    // ------------------------------------------------------------------------

    fn fill(&mut self, rect: Rect, color: [u8; 3]) {
        self.blocks.push(Block::Fill { rect, color });
    }

    fn media_at(&mut self, url: &str, kind: MediaKind, rect: Rect) {
        let url = url.trim();
        self.media.push(url, kind);
        self.blocks.push(Block::Media(MediaBox {
            rect,
            url: url.to_string(),
            kind,
        }));
    }

    /// Wrap and place text in a column; returns the height used.
    fn text_at(
        &mut self,
        text: &str,
        x: f32,
        top: f32,
        width: f32,
        size: f32,
        color: [u8; 3],
    ) -> f32 {
        let line_height = self.typeface.line_height(size);
        let ascent = self.typeface.ascent(size);
        let lines = wrap_text(self.typeface, text, size, width);
        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            self.blocks.push(Block::Text(TextRun {
                text: line.clone(),
                x,
                baseline: top + i as f32 * line_height + ascent,
                size,
                color,
            }));
        }
        lines.len() as f32 * line_height
    }

    /// Full-width text at the cursor.
    fn paragraph(&mut self, text: &str, size: f32, color: [u8; 3]) {
        let (x, width) = (self.left(), self.content_width());
        self.y += self.text_at(text, x, self.y, width, size, color);
    }

    fn heading(&mut self, title: &str) {
        let accent = self.style.palette.accent;
        self.fill(Rect::new(self.left(), self.y, 48.0, 4.0), accent);
        self.y += 12.0;
        self.paragraph(title, HEADING_SIZE, accent);
        self.y += 12.0;
    }

    fn subheading(&mut self, title: &str) {
        self.paragraph(title, SUBHEADING_SIZE, self.style.palette.text);
        self.y += 4.0;
    }

    fn bullets<'t>(&mut self, items: impl IntoIterator<Item = &'t str>) {
        let text = self.style.palette.text;
        for item in items {
            self.paragraph(&format!("• {item}"), BODY_SIZE, text);
        }
        self.y += ELEMENT_GAP;
    }

    fn photo(&mut self, url: &str, kind: MediaKind, x: f32, width: f32) {
        let rect = Rect::new(x, self.y, width, (width * PHOTO_RATIO).round());
        self.media_at(url, kind, rect);
        self.y = rect.bottom() + ELEMENT_GAP;
    }

    fn begin_card(&mut self) -> CardStart {
        let start = CardStart {
            block_index: self.blocks.len(),
            top: self.y,
        };
        self.y += CARD_PADDING;
        start
    }

    fn end_card(&mut self, start: CardStart) {
        self.y += CARD_PADDING;
        let rect = Rect::new(self.left(), start.top, self.content_width(), self.y - start.top);
        self.blocks.insert(
            start.block_index,
            Block::Fill {
                rect,
                color: self.style.palette.card,
            },
        );
        self.y += ELEMENT_GAP;
    }

    // ------------------------------------------------------------------------
    // Sections
    // ------------------------------------------------------------------------

    fn welcome(&mut self, model: &ContentModel) {
        let style = self.style;
        let palette = style.palette;
        let property = &model.property;
        let width = style.width as f32;

        self.fill(Rect::new(0.0, 0.0, width, HEADER_HEIGHT), palette.accent);
        let mut brand_x = self.left();
        if let Some(logo) = style.logo_url.as_deref() {
            let top = (HEADER_HEIGHT - LOGO_SIZE) / 2.0;
            self.media_at(logo, MediaKind::Photo, Rect::new(brand_x, top, LOGO_SIZE, LOGO_SIZE));
            brand_x += LOGO_SIZE + CARD_PADDING;
        }
        let brand_top = ((HEADER_HEIGHT - self.typeface.line_height(BRAND_SIZE)) / 2.0).max(0.0);
        let brand_width = width - brand_x - self.left();
        self.text_at(
            &style.brand_name,
            brand_x,
            brand_top,
            brand_width,
            BRAND_SIZE,
            palette.background,
        );
        self.y = HEADER_HEIGHT + style.padding as f32;

        if !property.name.trim().is_empty() {
            self.paragraph(property.name.trim(), TITLE_SIZE, palette.text);
            self.y += 16.0;
        }

        if let Some(cover) = property.cover_photo() {
            self.photo(cover, MediaKind::Photo, self.left(), self.content_width());
        }

        if let Some(description) = non_empty(&property.description) {
            self.paragraph(description, BODY_SIZE, palette.text);
            self.y += ELEMENT_GAP;
        }

        if let Some(link) = non_empty(&property.guidebook_url) {
            self.link_code(link);
        }

        let host = &model.host;
        if !host.display_name.trim().is_empty() {
            self.host_card(model);
        }

        let map = property
            .coordinates()
            .and_then(|(lat, lon)| style.welcome.static_map_url(lat, lon));
        if let Some(map_url) = map {
            let width = self.content_width();
            let rect = Rect::new(self.left(), self.y, width, (width * MAP_RATIO).round());
            self.media_at(&map_url, MediaKind::Photo, rect);
            self.y = rect.bottom() + ELEMENT_GAP;
        }
    }

    /// The guidebook link with its scannable code on the left.
    fn link_code(&mut self, link: &str) {
        let palette = self.style.palette;
        let top = self.y;
        let frame = Rect::new(self.left(), top, LINK_CODE_SIZE, LINK_CODE_SIZE);
        let grid = Rect::new(
            frame.x + LINK_CODE_QUIET_ZONE,
            frame.y + LINK_CODE_QUIET_ZONE,
            frame.width - 2.0 * LINK_CODE_QUIET_ZONE,
            frame.height - 2.0 * LINK_CODE_QUIET_ZONE,
        );
        let code = self
            .style
            .welcome
            .link_code
            .then(|| LinkCode::encode(link, grid, LINK_CODE_DARK))
            .flatten();

        let (x, code_height) = match code {
            Some(code) => {
                self.fill(frame, LINK_CODE_LIGHT);
                self.blocks.push(Block::Code(code));
                (frame.right() + 24.0, LINK_CODE_SIZE)
            }
            None => (self.left(), 0.0),
        };
        let column = self.left() + self.content_width() - x;
        let mut used = 0.0;
        if code_height > 0.0 {
            used += self.text_at(
                "Scan to open this guidebook on your phone",
                x,
                top,
                column,
                BODY_SIZE,
                palette.text,
            );
        }
        used += self.text_at(link, x, top + used, column, CAPTION_SIZE, palette.text_muted);
        self.y = top + used.max(code_height) + ELEMENT_GAP;
    }

    fn host_card(&mut self, model: &ContentModel) {
        let palette = self.style.palette;
        let host = &model.host;
        let card = self.begin_card();
        let top = self.y;
        let mut x = self.left() + CARD_PADDING;
        let mut media_height = 0.0;
        if let Some(avatar) = non_empty(&host.avatar_url) {
            self.media_at(avatar, MediaKind::Photo, Rect::new(x, top, AVATAR_SIZE, AVATAR_SIZE));
            x += AVATAR_SIZE + CARD_PADDING;
            media_height = AVATAR_SIZE;
        }
        let column = self.left() + self.content_width() - CARD_PADDING - x;

        let mut used = self.text_at("Your host", x, top, column, CAPTION_SIZE, palette.text_muted);
        used += self.text_at(
            host.display_name.trim(),
            x,
            top + used,
            column,
            SUBHEADING_SIZE,
            palette.text,
        );
        for contact in [non_empty(&host.email), non_empty(&host.phone)].into_iter().flatten() {
            used += self.text_at(contact, x, top + used, column, CAPTION_SIZE, palette.text_muted);
        }
        self.y = top + used.max(media_height);
        self.end_card(card);
    }

    fn getting_here(&mut self, model: &ContentModel) {
        let palette = self.style.palette;
        let property = &model.property;
        self.heading(SectionKind::GettingHere.title());

        let address = property.address.as_ref().map(|a| a.lines()).unwrap_or_default();
        if !address.is_empty() {
            for line in &address {
                self.paragraph(line, BODY_SIZE, palette.text);
            }
            self.y += ELEMENT_GAP;
        }
        if let Some(directions) = non_empty(&property.getting_here) {
            self.paragraph(directions, BODY_SIZE, palette.text);
            self.y += ELEMENT_GAP;
        }
    }

    fn check_in(&mut self, model: &ContentModel) {
        let palette = self.style.palette;
        let property = &model.property;
        let check_in = &property.check_in;
        self.heading(SectionKind::CheckIn.title());

        if let Some(time) = non_empty(&check_in.time) {
            self.paragraph(&format!("Check-in from {time}"), SUBHEADING_SIZE, palette.text);
            self.y += ELEMENT_GAP;
        }

        let policies: Vec<&str> = check_in.policies.iter().filter_map(|p| p.label()).collect();
        if !policies.is_empty() {
            self.bullets(policies);
        }

        if let Some(notes) = non_empty(&check_in.access_notes) {
            self.paragraph(notes, BODY_SIZE, palette.text);
            self.y += ELEMENT_GAP;
        }

        if let Some(video) = non_empty(&property.check_in_video_url) {
            self.paragraph("Check-in video", CAPTION_SIZE, palette.text_muted);
            self.y += 6.0;
            self.photo(video, MediaKind::Video, self.left(), self.content_width());
        }

        let rules: Vec<HouseRule> = property
            .house_rules
            .iter()
            .copied()
            .filter(|r| r.label().is_some())
            .collect();
        if !rules.is_empty() {
            self.subheading("House Rules");
            for rule in rules {
                let Some(label) = rule.label() else { continue };
                self.paragraph(&format!("• {label}"), BODY_SIZE, palette.text);
                if rule == HouseRule::AdditionalRules {
                    if let Some(text) = non_empty(&property.additional_rules) {
                        let x = self.left() + 24.0;
                        let width = self.content_width() - 24.0;
                        self.y +=
                            self.text_at(text, x, self.y, width, BODY_SIZE, palette.text_muted);
                    }
                }
            }
            self.y += ELEMENT_GAP;
        }
    }

    fn wifi_access(&mut self, item: &EquipmentItem) {
        let palette = self.style.palette;
        self.heading(SectionKind::WifiAccess.title());
        let card = self.begin_card();
        let x = self.left() + CARD_PADDING;
        let column = self.content_width() - 2.0 * CARD_PADDING;
        let fields = [
            ("Network", non_empty(&item.wifi_name)),
            ("Password", non_empty(&item.wifi_password)),
        ];
        for (label, value) in fields {
            let Some(value) = value else { continue };
            self.y += self.text_at(label, x, self.y, column, CAPTION_SIZE, palette.text_muted);
            self.y += self.text_at(value, x, self.y, column, SUBHEADING_SIZE, palette.text);
        }
        self.end_card(card);
    }

    fn house_manual(&mut self, items: &[&EquipmentItem]) {
        let palette = self.style.palette;
        self.heading(SectionKind::HouseManual.title());
        for item in items {
            let card = self.begin_card();
            let x = self.left() + CARD_PADDING;
            let column = self.content_width() - 2.0 * CARD_PADDING;
            self.y += self.text_at(
                category_title(&item.name),
                x,
                self.y,
                column,
                SUBHEADING_SIZE,
                palette.text,
            );
            if let Some(description) = non_empty(&item.description) {
                self.y += 6.0;
                self.y += self.text_at(description, x, self.y, column, BODY_SIZE, palette.text);
            }
            if let Some(url) = non_empty(&item.media_url) {
                self.y += 12.0;
                let rect = Rect::new(x, self.y, column, (column * PHOTO_RATIO).round());
                self.media_at(url, item.media_kind, rect);
                self.y = rect.bottom();
            }
            self.end_card(card);
        }
    }

    fn check_out(&mut self, model: &ContentModel) {
        let palette = self.style.palette;
        let check_out = &model.property.check_out;
        self.heading(SectionKind::CheckOut.title());

        if let Some(time) = non_empty(&check_out.time) {
            self.paragraph(&format!("Check-out by {time}"), SUBHEADING_SIZE, palette.text);
            self.y += ELEMENT_GAP;
        }
        let late: Vec<&str> = check_out.late_checkout.iter().filter_map(|t| t.label()).collect();
        if !late.is_empty() {
            self.subheading("Late check-out");
            self.bullets(late);
        }
        let before: Vec<&str> = check_out
            .before_checkout
            .iter()
            .filter_map(|t| t.label())
            .collect();
        if !before.is_empty() {
            self.subheading("Before you leave");
            self.bullets(before);
        }
    }

    fn nearby(&mut self, title: &str, places: &[&NearbyPlace]) {
        let palette = self.style.palette;
        self.heading(title);
        let columns = GALLERY_COLUMNS as f32;
        let column = (self.content_width() - GALLERY_GUTTER * (columns - 1.0)) / columns;

        for row in places.chunks(GALLERY_COLUMNS) {
            let top = self.y;
            let mut row_height: f32 = 0.0;
            for (i, place) in row.iter().enumerate() {
                let x = self.left() + i as f32 * (column + GALLERY_GUTTER);
                let photo = Rect::new(x, top, column, (column * PLACE_PHOTO_RATIO).round());
                match non_empty(&place.photo_url) {
                    Some(url) => self.media_at(url, MediaKind::Photo, photo),
                    None => self.fill(photo, palette.card),
                }
                let mut used = photo.height + 10.0;
                used +=
                    self.text_at(place.name.trim(), x, top + used, column, BODY_SIZE, palette.text);
                if let Some(rating) = place.rating {
                    let line = format!("Rated {rating:.1} / 5");
                    let muted = palette.text_muted;
                    used += self.text_at(&line, x, top + used, column, CAPTION_SIZE, muted);
                }
                if let Some(address) = non_empty(&place.address) {
                    let muted = palette.text_muted;
                    used += self.text_at(address, x, top + used, column, CAPTION_SIZE, muted);
                }
                row_height = row_height.max(used);
            }
            self.y = top + row_height + GALLERY_GUTTER;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BeforeCheckout, NearbyPlace};
    use crate::raster::typeface::BlockTypeface;
    use crate::test_helpers::villa_azur;

    fn build(model: &ContentModel) -> ContentSurface {
        build_surface(model, &SurfaceStyle::default(), &BlockTypeface)
    }

    // =========================================================================
    // Word wrap
    // =========================================================================

    #[test]
    fn wrap_keeps_short_text_on_one_line() {
        assert_eq!(wrap_text(&BlockTypeface, "hello world", 10.0, 1000.0), vec!["hello world"]);
    }

    #[test]
    fn wrap_breaks_on_word_boundaries() {
        // 10px block advance is 5.5px: "aaaa bbbb" is 49.5px wide.
        let lines = wrap_text(&BlockTypeface, "aaaa bbbb cccc", 10.0, 30.0);
        assert_eq!(lines, vec!["aaaa", "bbbb", "cccc"]);
    }

    #[test]
    fn wrap_preserves_explicit_newlines() {
        let lines = wrap_text(&BlockTypeface, "one\n\ntwo", 10.0, 1000.0);
        assert_eq!(lines, vec!["one", "", "two"]);
    }

    #[test]
    fn wrap_breaks_overlong_words() {
        let lines = wrap_text(&BlockTypeface, "abcdefghij", 10.0, 23.0);
        // 4 characters (22px) fit in 23px
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wrap_of_empty_text_has_no_lines() {
        assert!(wrap_text(&BlockTypeface, "", 10.0, 100.0).is_empty());
    }

    // =========================================================================
    // Surface geometry
    // =========================================================================

    #[test]
    fn surface_has_configured_width() {
        let surface = build(&villa_azur());
        assert_eq!(surface.width, 1000);
        assert!(surface.height > 0);
    }

    #[test]
    fn villa_azur_fits_on_one_a4_page() {
        let surface = build(&villa_azur());
        // A4 portrait at 1000px wide is ~1414px tall.
        let page_height = 1000.0 * 841.89 / 595.28;
        assert!(
            (surface.height as f64) <= page_height,
            "surface height {} exceeds one page",
            surface.height
        );
    }

    #[test]
    fn every_block_lies_within_the_surface() {
        let mut model = villa_azur();
        model.property.description = Some("word ".repeat(400));
        model.nearby_places = (0..5)
            .map(|i| NearbyPlace {
                name: format!("Place {i}"),
                types: vec!["museum".into()],
                rating: Some(4.0),
                ..Default::default()
            })
            .collect();
        let surface = build(&model);
        for block in &surface.blocks {
            let rect = match block {
                Block::Fill { rect, .. } => *rect,
                Block::Media(media) => media.rect,
                Block::Code(code) => code.rect,
                Block::Text(run) => Rect::new(run.x, run.baseline - run.size, 0.0, run.size),
            };
            assert!(rect.x >= 0.0 && rect.right() <= surface.width as f32 + 0.01, "{block:?}");
            assert!(rect.y >= 0.0 && rect.bottom() <= surface.height as f32, "{block:?}");
        }
    }

    #[test]
    fn text_stays_inside_the_content_column() {
        let mut model = villa_azur();
        model.property.description = Some("lorem ipsum dolor sit amet ".repeat(50));
        let surface = build(&model);
        for run in surface.text_runs() {
            let right = run.x + BlockTypeface.measure(&run.text, run.size);
            assert!(right <= 1000.0 - 48.0 + 0.01, "{:?} overflows", run.text);
        }
    }

    #[test]
    fn height_grows_with_content() {
        let short = build(&villa_azur());
        let mut model = villa_azur();
        model.property.description = Some("word ".repeat(300));
        assert!(build(&model).height > short.height);
    }

    #[test]
    fn building_is_deterministic() {
        let model = villa_azur();
        assert_eq!(build(&model), build(&model));
    }

    // =========================================================================
    // Media manifest
    // =========================================================================

    #[test]
    fn manifest_lists_cover_photo() {
        let surface = build(&villa_azur());
        let urls: Vec<&str> = surface.media.entries().iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, vec!["https://media.example/villa-azur/front.jpg"]);
        assert_eq!(surface.media_boxes().count(), 1);
    }

    #[test]
    fn check_in_video_is_a_video_entry() {
        let mut model = villa_azur();
        model.property.check_in_video_url = Some("https://youtu.be/abc123".into());
        let surface = build(&model);
        assert_eq!(surface.media.video_count(), 1);
        let video = surface
            .media_boxes()
            .find(|m| m.kind == MediaKind::Video)
            .unwrap();
        assert_eq!(video.url, "https://youtu.be/abc123");
    }

    #[test]
    fn link_code_is_drawn_locally() {
        let mut model = villa_azur();
        model.property.guidebook_url = Some("https://guide.example/villa-azur".into());
        model.property.latitude = Some(43.58);
        model.property.longitude = Some(7.12);
        let surface = build(&model);
        let codes: Vec<&LinkCode> = surface.link_codes().collect();
        assert_eq!(codes.len(), 1);
        assert_eq!(codes[0].rect.width, LINK_CODE_SIZE - 2.0 * LINK_CODE_QUIET_ZONE);
        // Only the cover photo needs loading with the stock config
        assert_eq!(surface.media.len(), 1);
        assert!(surface.text_runs().any(|r| r.text == "https://guide.example/villa-azur"));
    }

    #[test]
    fn static_map_is_listed_when_a_template_is_configured() {
        let mut model = villa_azur();
        model.property.latitude = Some(43.58);
        model.property.longitude = Some(7.12);
        let mut style = SurfaceStyle::default();
        style.welcome.static_map_template = "https://maps.example/{lat},{lon}.png".into();
        let surface = build_surface(&model, &style, &BlockTypeface);
        let urls: Vec<&str> = surface.media.entries().iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[1], "https://maps.example/43.580000,7.120000.png");
    }

    #[test]
    fn disabled_link_code_keeps_the_link_text() {
        let mut model = villa_azur();
        model.property.guidebook_url = Some("https://guide.example/villa-azur".into());
        let mut style = SurfaceStyle::default();
        style.welcome.link_code = false;
        let surface = build_surface(&model, &style, &BlockTypeface);
        assert_eq!(surface.link_codes().count(), 0);
        assert!(surface.text_runs().any(|r| r.text == "https://guide.example/villa-azur"));
    }

    #[test]
    fn logo_replaces_nothing_but_is_listed() {
        let mut style = SurfaceStyle::default();
        style.logo_url = Some("https://brand.example/logo.png".into());
        let surface = build_surface(&villa_azur(), &style, &BlockTypeface);
        assert_eq!(surface.media.entries()[0].url, "https://brand.example/logo.png");
        assert!(surface.text_runs().any(|r| r.text == "Guidebook"));
    }

    #[test]
    fn shared_urls_appear_once_in_manifest() {
        let mut model = villa_azur();
        model.property.gallery = vec!["https://media.example/villa-azur/front.jpg".into()];
        model.nearby_places = vec![NearbyPlace {
            name: "Beach bar".into(),
            types: vec!["bar".into()],
            photo_url: Some("https://media.example/villa-azur/front.jpg".into()),
            ..Default::default()
        }];
        let surface = build(&model);
        assert_eq!(surface.media.len(), 1);
        assert_eq!(surface.media_boxes().count(), 2);
    }

    // =========================================================================
    // Section content
    // =========================================================================

    #[test]
    fn check_in_prints_time() {
        let surface = build(&villa_azur());
        assert!(surface.text_runs().any(|r| r.text == "Check-in from 14:00"));
    }

    #[test]
    fn check_out_prints_labels() {
        let mut model = villa_azur();
        model.property.check_out.before_checkout = vec![BeforeCheckout::ReturnKeys];
        let surface = build(&model);
        assert!(surface.text_runs().any(|r| r.text == "• Return the keys"));
        assert!(surface.text_runs().any(|r| r.text == "Check-Out"));
    }

    #[test]
    fn card_background_is_painted_before_its_content() {
        let mut model = villa_azur();
        model.host.display_name = "Claire".into();
        let surface = build(&model);
        let fill_index = surface
            .blocks
            .iter()
            .position(|b| matches!(b, Block::Fill { color, .. } if *color == surface.placeholder))
            .unwrap();
        let name_index = surface
            .blocks
            .iter()
            .position(|b| matches!(b, Block::Text(run) if run.text == "Claire"))
            .unwrap();
        assert!(fill_index < name_index);
    }
}
