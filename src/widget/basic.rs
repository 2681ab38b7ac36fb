//! Built-in widgets: [`Block`], [`Text`], [`Floating`], [`FocusTrap`], [`Disabled`].

use std::sync::Arc;

use crossterm::event::KeyEvent;

use super::{
    Container, Content, KeyCallback, LayoutCallback, Node, PaintInfo, ScopeKind, Style, Widget,
    WidgetKind, WidgetRef,
};
use crate::color::Paint;
use crate::layout::{
    Align, BoxModel, Constraints, Dimension, Edges, FlexDirection, Justify, LayoutStyle,
    MeasureFn, Position, measure_text_height, string_width, trimmed_width, wrap_text,
};
use crate::pipeline::{BuildContext, FloatConfig, RenderContext};
use crate::signal::Signal;
use crate::state::ScrollState;
use crate::types::{Attr, BorderStyle, Rgba};

// =============================================================================
// Block
// =============================================================================

/// Container with background, border and flex children.
#[derive(Clone, Default)]
pub struct Block {
    id: Option<String>,
    style: Style,
    layout: LayoutStyle,
    container: Container,
    children: Vec<WidgetRef>,
    content: Option<Arc<dyn Content>>,
    focusable: bool,
    on_key: Option<KeyCallback>,
    on_layout: Option<LayoutCallback>,
}

impl Block {
    /// Column container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Row container.
    pub fn row() -> Self {
        let mut b = Self::default();
        b.layout.direction = FlexDirection::Row;
        b
    }

    /// Layered container; children may paint outside it.
    pub fn stack() -> Self {
        Self {
            container: Container::Stack,
            ..Self::default()
        }
    }

    /// Vertically scrollable column.
    pub fn scroll(state: ScrollState) -> Self {
        Self {
            container: Container::ScrollV(state),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn background(mut self, paint: impl Into<Paint>) -> Self {
        self.style.background = Some(paint.into());
        self
    }

    pub fn foreground(mut self, paint: impl Into<Paint>) -> Self {
        self.style.foreground = Some(paint.into());
        self
    }

    pub fn border(mut self, border: BorderStyle) -> Self {
        self.style.border = border;
        self
    }

    pub fn border_color(mut self, paint: impl Into<Paint>) -> Self {
        self.style.border_color = Some(paint.into());
        self
    }

    pub fn focus_border_color(mut self, color: Rgba) -> Self {
        self.style.focus_border_color = Some(color);
        self
    }

    pub fn attrs(mut self, attrs: Attr) -> Self {
        self.style.attrs = attrs;
        self
    }

    pub fn width(mut self, width: Dimension) -> Self {
        self.layout.width = width;
        self
    }

    pub fn height(mut self, height: Dimension) -> Self {
        self.layout.height = height;
        self
    }

    /// Fixed size in cells.
    pub fn size(self, width: i32, height: i32) -> Self {
        self.width(Dimension::Cells(width))
            .height(Dimension::Cells(height))
    }

    pub fn min_height(mut self, height: Dimension) -> Self {
        self.layout.min_height = height;
        self
    }

    pub fn max_width(mut self, width: Dimension) -> Self {
        self.layout.max_width = width;
        self
    }

    pub fn padding(mut self, padding: Edges) -> Self {
        self.layout.padding = padding;
        self
    }

    pub fn margin(mut self, margin: Edges) -> Self {
        self.layout.margin = margin;
        self
    }

    pub fn gap(mut self, gap: i32) -> Self {
        self.layout.gap = gap;
        self
    }

    pub fn grow(mut self, grow: f32) -> Self {
        self.layout.grow = grow;
        self
    }

    pub fn justify(mut self, justify: Justify) -> Self {
        self.layout.justify = justify;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.layout.align = align;
        self
    }

    /// Position inside a stacking parent, or with [`Block::absolute`].
    pub fn offset(mut self, x: i32, y: i32) -> Self {
        self.layout.offset = (x, y);
        self
    }

    /// Out of flow at `(x, y)` inside the parent's content box.
    pub fn absolute(mut self, x: i32, y: i32) -> Self {
        self.layout.position = Position::Absolute;
        self.offset(x, y)
    }

    pub fn child(mut self, child: impl Widget + 'static) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    pub fn child_ref(mut self, child: WidgetRef) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = WidgetRef>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn content(mut self, content: impl Content + 'static) -> Self {
        self.content = Some(Arc::new(content));
        self
    }

    pub fn focusable(mut self) -> Self {
        self.focusable = true;
        self
    }

    pub fn on_key(mut self, f: impl Fn(&KeyEvent) -> bool + Send + Sync + 'static) -> Self {
        self.on_key = Some(Arc::new(f));
        self
    }

    pub fn on_layout(mut self, f: impl Fn(&BoxModel) + Send + Sync + 'static) -> Self {
        self.on_layout = Some(Arc::new(f));
        self
    }

    pub fn into_ref(self) -> WidgetRef {
        Arc::new(self)
    }
}

impl Widget for Block {
    fn build(&self, _cx: &BuildContext) -> Node {
        Node {
            style: self.style.clone(),
            layout: self.layout.clone(),
            measure: None,
            container: self.container.clone(),
            content: self.content.clone(),
            children: self.children.clone(),
            on_layout: self.on_layout.clone(),
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn is_focusable(&self) -> bool {
        self.focusable
    }

    fn handles_keys(&self) -> bool {
        self.on_key.is_some()
    }

    fn on_key(&self, key: &KeyEvent) -> bool {
        self.on_key.as_ref().is_some_and(|f| f(key))
    }
}

// =============================================================================
// Text
// =============================================================================

#[derive(Clone)]
enum TextSource {
    Static(String),
    Dynamic(Signal<String>),
}

/// A run of text, optionally wrapped, measured by the fallback path.
#[derive(Clone)]
pub struct Text {
    id: Option<String>,
    source: TextSource,
    style: Style,
    layout: LayoutStyle,
    wrap: bool,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self::from_source(TextSource::Static(text.into()))
    }

    /// Text read from a signal at build time.
    pub fn dynamic(signal: Signal<String>) -> Self {
        Self::from_source(TextSource::Dynamic(signal))
    }

    fn from_source(source: TextSource) -> Self {
        Self {
            id: None,
            source,
            style: Style::default(),
            layout: LayoutStyle::default(),
            wrap: true,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn color(mut self, paint: impl Into<Paint>) -> Self {
        self.style.foreground = Some(paint.into());
        self
    }

    pub fn background(mut self, paint: impl Into<Paint>) -> Self {
        self.style.background = Some(paint.into());
        self
    }

    pub fn attrs(mut self, attrs: Attr) -> Self {
        self.style.attrs = attrs;
        self
    }

    pub fn padding(mut self, padding: Edges) -> Self {
        self.layout.padding = padding;
        self
    }

    pub fn no_wrap(mut self) -> Self {
        self.wrap = false;
        self
    }

    pub fn grow(mut self, grow: f32) -> Self {
        self.layout.grow = grow;
        self
    }

    pub fn into_ref(self) -> WidgetRef {
        Arc::new(self)
    }
}

fn text_lines(text: &str, width: i32, wrap: bool) -> Vec<String> {
    if wrap {
        wrap_text(text, width)
    } else {
        text.lines().map(str::to_string).collect()
    }
}

impl Widget for Text {
    fn build(&self, cx: &BuildContext) -> Node {
        let text = match &self.source {
            TextSource::Static(s) => s.clone(),
            TextSource::Dynamic(signal) => signal.get(cx),
        };

        let wrap = self.wrap;
        let measured = text.clone();
        let measure: MeasureFn = Arc::new(move |c: Constraints| {
            let natural = measured.lines().map(string_width).max().unwrap_or(0);
            let width = natural.min(c.max_width).max(c.min_width);
            let height = if wrap {
                measure_text_height(&measured, width)
            } else {
                measured.lines().count() as i32
            };
            (width, height.min(c.max_height).max(c.min_height))
        });

        Node {
            style: self.style.clone(),
            layout: self.layout.clone(),
            measure: Some(measure),
            content: Some(Arc::new(TextContent { text, wrap })),
            ..Node::default()
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Painter for [`Text`].
struct TextContent {
    text: String,
    wrap: bool,
}

impl Content for TextContent {
    fn paint(&self, ctx: &mut RenderContext<'_>, info: &PaintInfo<'_>) {
        let lines = text_lines(&self.text, ctx.width(), self.wrap);
        let attrs = if info.disabled {
            info.attrs | Attr::DIM
        } else {
            info.attrs
        };

        let extent_w = lines.iter().map(|l| trimmed_width(l)).max().unwrap_or(0);
        let extent = (extent_w, lines.len() as i32);
        let fallback = Paint::Solid(Rgba::TERMINAL_DEFAULT);
        let paint = info.foreground.unwrap_or(&fallback);

        for (row, line) in lines.iter().enumerate() {
            ctx.draw_span(0, row as i32, line, paint, extent, row as i32, attrs);
        }
    }
}

// =============================================================================
// Floating
// =============================================================================

/// Overlay queued during build and painted after the main tree.
#[derive(Clone)]
pub struct Floating {
    config: FloatConfig,
    child: WidgetRef,
    visible: Option<Signal<bool>>,
}

impl Floating {
    pub fn new(config: FloatConfig, child: impl Widget + 'static) -> Self {
        Self {
            config,
            child: Arc::new(child),
            visible: None,
        }
    }

    /// Only queue the float while `visible` is true.
    pub fn visible_when(mut self, visible: Signal<bool>) -> Self {
        self.visible = Some(visible);
        self
    }
}

impl Widget for Floating {
    fn build(&self, _cx: &BuildContext) -> Node {
        Node::default()
    }

    fn kind(&self) -> WidgetKind<'_> {
        WidgetKind::Floating {
            config: &self.config,
            child: &self.child,
            visible: self.visible.as_ref(),
        }
    }
}

// =============================================================================
// Scopes
// =============================================================================

/// Confines tab navigation to its descendants.
#[derive(Clone)]
pub struct FocusTrap {
    child: WidgetRef,
}

impl FocusTrap {
    pub fn new(child: impl Widget + 'static) -> Self {
        Self {
            child: Arc::new(child),
        }
    }
}

impl Widget for FocusTrap {
    fn build(&self, _cx: &BuildContext) -> Node {
        Node::default()
    }

    fn kind(&self) -> WidgetKind<'_> {
        WidgetKind::Scope(ScopeKind::FocusTrap, &self.child)
    }
}

/// Marks its descendants disabled: dimmed and unfocusable.
#[derive(Clone)]
pub struct Disabled {
    child: WidgetRef,
}

impl Disabled {
    pub fn new(child: impl Widget + 'static) -> Self {
        Self {
            child: Arc::new(child),
        }
    }
}

impl Widget for Disabled {
    fn build(&self, _cx: &BuildContext) -> Node {
        Node::default()
    }

    fn kind(&self) -> WidgetKind<'_> {
        WidgetKind::Scope(ScopeKind::Disabled, &self.child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_lines_respect_wrap_flag() {
        assert_eq!(text_lines("abcdef", 3, true), vec!["abc", "def"]);
        assert_eq!(text_lines("abcdef", 3, false), vec!["abcdef"]);
    }

    #[test]
    fn test_block_builder_sets_layout() {
        let b = Block::row().size(10, 2).gap(1).padding(Edges::all(1));
        assert_eq!(b.layout.direction, FlexDirection::Row);
        assert_eq!(b.layout.width, Dimension::Cells(10));
        assert_eq!(b.layout.gap, 1);
        assert!(!b.is_focusable());
        assert!(!b.handles_keys());
    }

    #[test]
    fn test_block_key_handler() {
        use crossterm::event::{KeyCode, KeyModifiers};

        let b = Block::new().focusable().on_key(|k| k.code == KeyCode::Enter);
        assert!(b.handles_keys());
        assert!(Widget::on_key(&b, &KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
        assert!(!Widget::on_key(&b, &KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
    }

    #[test]
    fn test_scopes_resolve_to_child() {
        let trap = FocusTrap::new(Text::new("x"));
        assert!(matches!(trap.kind(), WidgetKind::Scope(ScopeKind::FocusTrap, _)));
        let off = Disabled::new(Text::new("x"));
        assert!(matches!(off.kind(), WidgetKind::Scope(ScopeKind::Disabled, _)));
    }
}
