use std::str::FromStr;

use crate::foundation::core::{PixelFormat, Rect};
use crate::spec::model::{ContentType, SurfaceSpec};

/// Parse the line-oriented spec format.
///
/// Every problem in this format is advisory: the offending line is reported with `origin` and its
/// line number, and the field keeps its default.
pub fn parse_str(text: &str, origin: &str) -> Vec<SurfaceSpec> {
    let mut specs = Vec::new();
    let mut current: Option<SurfaceSpec> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line == "surface" {
            if let Some(spec) = current.take() {
                specs.push(spec);
            }
            current = Some(SurfaceSpec::default());
            continue;
        }

        let Some(spec) = current.as_mut() else {
            tracing::warn!(
                file = origin,
                line = line_no,
                "ignoring '{line}' before first 'surface' keyword"
            );
            continue;
        };

        let at = LineCursor {
            origin,
            line_no,
            line,
        };
        apply_line(spec, &at);
    }

    if let Some(spec) = current {
        specs.push(spec);
    }
    specs
}

struct LineCursor<'a> {
    origin: &'a str,
    line_no: usize,
    line: &'a str,
}

impl LineCursor<'_> {
    fn key(&self) -> &str {
        self.line.split_whitespace().next().unwrap_or("")
    }

    /// Everything after the key, trimmed.
    fn rest(&self) -> &str {
        let key = self.key();
        self.line[key.len()..].trim()
    }

    fn values(&self) -> impl Iterator<Item = &str> {
        self.line.split_whitespace().skip(1)
    }

    fn warn(&self, msg: &str) {
        tracing::warn!(file = self.origin, line = self.line_no, "{msg}");
    }

    fn num<T: FromStr>(&self, slot: &mut T) {
        match self.values().next().map(str::parse::<T>) {
            Some(Ok(v)) => *slot = v,
            _ => self.warn(&format!("invalid {}", self.key())),
        }
    }

    fn flag(&self, slot: &mut bool) {
        match self.values().next() {
            Some("1") | Some("true") => *slot = true,
            Some("0") | Some("false") => *slot = false,
            Some(other) => match other.parse::<i64>() {
                Ok(_) => *slot = false,
                Err(_) => self.warn(&format!("unknown {} '{other}'", self.key())),
            },
            None => self.warn(&format!("invalid {}", self.key())),
        }
    }

    /// `x y w h`. A missing origin zeroes the whole rectangle; a missing size zeroes the size.
    fn rect(&self, warn_size: bool) -> Rect {
        let nums: Vec<Option<i32>> = self.values().take(4).map(|v| v.parse().ok()).collect();
        let get = |i: usize| nums.get(i).copied().flatten();

        let (Some(x), Some(y)) = (get(0), get(1)) else {
            self.warn(&format!("invalid x and/or y in {}, defaulting to 0", self.key()));
            return Rect::default();
        };
        let (w, h) = match (get(2), get(3)) {
            (Some(w), Some(h)) => (w, h),
            _ => {
                if warn_size {
                    self.warn(&format!(
                        "invalid w and/or h in {}, defaulting to 0",
                        self.key()
                    ));
                }
                (0, 0)
            }
        };
        Rect::from_xywh(x, y, w, h)
    }
}

fn parse_flags(v: &str) -> Option<u32> {
    match v.strip_prefix("0x").or_else(|| v.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => v.parse().ok(),
    }
}

fn apply_line(spec: &mut SurfaceSpec, at: &LineCursor<'_>) {
    let up = &mut spec.update;
    match at.key() {
        "name" => {
            let rest = at.rest();
            if rest.is_empty() {
                at.warn("empty name");
            } else {
                spec.name = rest.to_string();
            }
        }
        "content" => {
            let rest = at.rest();
            if rest.is_empty() {
                at.warn("invalid content");
            } else {
                spec.content = rest.to_string();
            }
        }
        "keepalive" => at.flag(&mut spec.keep_alive),
        "gl" => at.flag(&mut spec.gl),
        "format" => match at.values().next().map(PixelFormat::parse) {
            Some(Ok(f)) => spec.format = f,
            Some(Err(e)) => at.warn(&e.to_string()),
            None => at.warn("invalid format"),
        },
        "zorder" => at.num(&mut spec.z_order),
        "transform" => at.num(&mut spec.transform),
        "width" => {
            at.num(&mut spec.src.width);
            if spec.src.width > spec.src.stride {
                spec.src.stride = spec.src.width;
            }
        }
        "height" => at.num(&mut spec.src.height),
        "stride" => {
            at.num(&mut spec.src.stride);
            if spec.src.width > spec.src.stride {
                spec.src.width = spec.src.stride;
            }
        }
        "crop" => spec.src.crop = at.rect(false),
        "output" => spec.output = at.rect(false),
        "contenttype" => match at.values().next() {
            Some("solid") => spec.content_type = ContentType::Solid,
            Some("file") => spec.content_type = ContentType::File,
            Some("plugin") => spec.content_type = ContentType::Plugin,
            _ => at.warn("invalid contenttype"),
        },
        "flags" => match at.values().next().and_then(parse_flags) {
            Some(v) => spec.flags = v,
            None => at.warn("invalid flags"),
        },
        "update_iterations" => at.num(&mut up.iterations),
        "update_latency" => at.num(&mut up.latency_us),
        "update_content_on" => at.num(&mut up.content_cycle.on),
        "update_content_off" => at.num(&mut up.content_cycle.off),
        "update_content_show_on" => at.num(&mut up.show_cycle.on),
        "update_content_show_off" => at.num(&mut up.show_cycle.off),
        "update_position_on" => at.num(&mut up.position_cycle.on),
        "update_position_off" => at.num(&mut up.position_cycle.off),
        "update_size_on" => at.num(&mut up.size_cycle.on),
        "update_size_off" => at.num(&mut up.size_cycle.off),
        "update_output_step" => up.output_step = at.rect(true),
        "update_output_limit" => up.output_limit = at.rect(true),
        _ => at.warn(&format!("ignored line '{}'", at.line)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/spec/parser.rs"]
mod tests;
