use panelcut::entities::{CutDirection, SheetLayout};
use panelcut::geometry::Rect;
use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use svg::Document;
use svg::node::element::{Definitions, Group, Line, Pattern, Rectangle, Text, Title};

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize, Copy)]
pub struct SvgDrawOptions {
    ///The theme to use for the svg
    #[serde(default)]
    pub theme: SvgLayoutTheme,
    ///Draw the cut lines on top of the parts
    #[serde(default)]
    pub cuts: bool,
    ///Draw the offcuts, hatched
    #[serde(default)]
    pub offcuts: bool,
    ///Write the label and dimensions inside every part
    #[serde(default)]
    pub labels: bool,
}

impl Default for SvgDrawOptions {
    fn default() -> Self {
        Self {
            theme: SvgLayoutTheme::default(),
            cuts: true,
            offcuts: true,
            labels: true,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize, Copy)]
pub struct SvgLayoutTheme {
    pub stroke_width_multiplier: f32,
    pub sheet_fill: Color,
    pub part_fill: Color,
    pub offcut_fill: Color,
    pub cut_stroke: Color,
}

impl Default for SvgLayoutTheme {
    fn default() -> Self {
        SvgLayoutTheme::EARTH_TONES
    }
}

impl SvgLayoutTheme {
    pub const EARTH_TONES: SvgLayoutTheme = SvgLayoutTheme {
        stroke_width_multiplier: 2.0,
        sheet_fill: Color(0xCC, 0x82, 0x4A),
        part_fill: Color(0xFF, 0xC8, 0x79),
        offcut_fill: Color(0x8F, 0x5B, 0x34),
        cut_stroke: Color(0xD0, 0x00, 0x00),
    };

    pub const GRAY: SvgLayoutTheme = SvgLayoutTheme {
        stroke_width_multiplier: 2.5,
        sheet_fill: Color(0xD3, 0xD3, 0xD3),
        part_fill: Color(0x7A, 0x7A, 0x7A),
        offcut_fill: Color(0x63, 0x63, 0x63),
        cut_stroke: Color(0x00, 0x00, 0x00),
    };
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Color(pub u8, pub u8, pub u8);

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl TryFrom<&str> for Color {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|c| u8::from_str_radix(c, 16).ok())
                .ok_or_else(|| format!("invalid color: {s}"))
        };
        match hex.len() {
            6 => Ok(Color(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            _ => Err(format!("invalid color: {s}")),
        }
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{self}"))
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Color::try_from(s.as_str()).map_err(D::Error::custom)
    }
}

fn rect_element(rect: &Rect, params: &[(&str, &str)]) -> Rectangle {
    let mut element = Rectangle::new()
        .set("x", rect.x_min)
        .set("y", rect.y_min)
        .set("width", rect.width())
        .set("height", rect.height());
    for param in params {
        element = element.set(param.0, param.1)
    }
    element
}

pub fn layout_to_svg(sheet: &SheetLayout, options: SvgDrawOptions, title: &str) -> Document {
    let bounds = sheet.bounds();
    let theme = &options.theme;
    let min_dim = f64::min(sheet.width, sheet.length);
    let margin = 0.05 * min_dim;
    let stroke_width = min_dim * 0.001 * theme.stroke_width_multiplier as f64;
    let font_size = min_dim * 0.02;

    let label = {
        //print some information above the top left of the sheet
        let label_content = format!(
            "{} #{} | {:.0} x {:.0} | utilization: {:.3}% | cuts: {} | {}",
            sheet.stock_id,
            sheet.index,
            sheet.width,
            sheet.length,
            sheet.utilization() * 100.0,
            sheet.cut_count(),
            title,
        );
        Text::new(label_content)
            .set("x", bounds.x_min)
            .set("y", bounds.y_min - 0.5 * margin)
            .set("font-size", font_size)
            .set("font-family", "monospace")
            .set("font-weight", "500")
    };

    let sheet_group = Group::new()
        .set("id", format!("sheet_{}", sheet.index))
        .add(rect_element(
            &bounds,
            &[
                ("fill", &*format!("{}", theme.sheet_fill)),
                ("stroke", "black"),
                ("stroke-width", &*format!("{}", 2.0 * stroke_width)),
            ],
        ))
        .add(Title::new(format!(
            "sheet: {}, width: {:.1}, length: {:.1}, kerf: {:.1}",
            sheet.stock_id, sheet.width, sheet.length, sheet.kerf
        )));

    let offcut_group = match options.offcuts {
        false => None,
        true => {
            let hatch = Pattern::new()
                .set("id", "hatch")
                .set("patternUnits", "userSpaceOnUse")
                .set("width", 4.0 * font_size)
                .set("height", 4.0 * font_size)
                .set("patternTransform", "rotate(45)")
                .add(
                    Line::new()
                        .set("x1", 0)
                        .set("y1", 0)
                        .set("x2", 0)
                        .set("y2", 4.0 * font_size)
                        .set("stroke", format!("{}", theme.offcut_fill))
                        .set("stroke-width", 2.0 * stroke_width),
                );
            let group = sheet.offcuts.iter().fold(
                Group::new()
                    .set("id", "offcuts")
                    .add(Definitions::new().add(hatch)),
                |group, offcut| {
                    group.add(
                        rect_element(
                            offcut,
                            &[
                                ("fill", "url(#hatch)"),
                                ("stroke", &*format!("{}", theme.offcut_fill)),
                                ("stroke-width", &*format!("{}", 0.5 * stroke_width)),
                            ],
                        )
                        .add(Title::new(format!(
                            "offcut: {:.1} x {:.1} at ({:.1}, {:.1})",
                            offcut.width(),
                            offcut.height(),
                            offcut.x_min,
                            offcut.y_min
                        ))),
                    )
                },
            );
            Some(group)
        }
    };

    let parts_group = sheet
        .placements
        .iter()
        .fold(Group::new().set("id", "parts"), |group, p| {
            let rect = p.rect();
            let mut part = Group::new()
                .add(
                    rect_element(
                        &rect,
                        &[
                            ("fill", &*format!("{}", theme.part_fill)),
                            ("stroke", "black"),
                            ("stroke-width", &*format!("{stroke_width}")),
                        ],
                    )
                    .add(Title::new(format!(
                        "part: {}, instance: {}, {:.1} x {:.1}, rotation: {}",
                        p.label,
                        p.instance_id,
                        p.width,
                        p.height,
                        p.rotation.degrees()
                    ))),
                );
            if options.labels {
                let size = f64::min(font_size, 0.2 * f64::min(p.width, p.height));
                part = part.add(
                    Text::new(format!("{} {:.0}x{:.0}", p.label, p.width, p.height))
                        .set("x", rect.x_min + 0.5 * rect.width())
                        .set("y", rect.y_min + 0.5 * rect.height())
                        .set("font-size", size)
                        .set("font-family", "monospace")
                        .set("text-anchor", "middle")
                        .set("dominant-baseline", "middle"),
                );
            }
            group.add(part)
        });

    let cut_group = match options.cuts {
        false => None,
        true => Some(sheet.cuts.iter().fold(
            Group::new().set("id", "cuts"),
            |group, cut| {
                let (x1, y1, x2, y2) = match cut.direction {
                    CutDirection::Horizontal => (cut.start, cut.position, cut.end, cut.position),
                    CutDirection::Vertical => (cut.position, cut.start, cut.position, cut.end),
                };
                group.add(
                    Line::new()
                        .set("x1", x1)
                        .set("y1", y1)
                        .set("x2", x2)
                        .set("y2", y2)
                        .set("stroke", format!("{}", theme.cut_stroke))
                        .set("stroke-width", stroke_width)
                        .set(
                            "stroke-dasharray",
                            format!("{} {}", 4.0 * stroke_width, 2.0 * stroke_width),
                        ),
                )
            },
        )),
    };

    let vbox = (
        bounds.x_min - margin,
        bounds.y_min - margin,
        bounds.width() + 2.0 * margin,
        bounds.height() + 2.0 * margin,
    );

    let optionals = [offcut_group, cut_group]
        .into_iter()
        .flatten()
        .fold(Group::new().set("id", "optionals"), |g, opt| g.add(opt));

    Document::new()
        .set("viewBox", vbox)
        .add(sheet_group)
        .add(parts_group)
        .add(optionals)
        .add(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_parse_from_hex() {
        assert_eq!(Color::try_from("#FFC879"), Ok(Color(0xFF, 0xC8, 0x79)));
        assert_eq!(Color::try_from("00ff00"), Ok(Color(0x00, 0xFF, 0x00)));
        assert!(Color::try_from("#12").is_err());
        assert_eq!(format!("{}", Color(0xCC, 0x82, 0x4A)), "#CC824A");
    }

    #[test]
    fn draw_options_round_trip_through_json() {
        let options = SvgDrawOptions {
            theme: SvgLayoutTheme::GRAY,
            cuts: false,
            ..SvgDrawOptions::default()
        };
        let json = serde_json::to_string(&options).unwrap();
        let parsed: SvgDrawOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, options);
    }
}
