//! SVG export, generated from the shape list rather than the rendered canvas.

use super::ExportError;
use crate::geometry;
use crate::shapes::{FONT_FAMILY, FONT_SIZE, SerializableColor, Shape, ShapeStyle};
use kurbo::{Point, Size};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

/// SVG namespace URI
const SVG_NS_URI: &str = "http://www.w3.org/2000/svg";
/// Canvas background, matching the on-screen clear color.
pub const BACKGROUND: SerializableColor = SerializableColor::rgb(0x11, 0x11, 0x11);

/// Serialize `shapes`, back to front, as an SVG document of the given size.
pub fn to_svg<'a>(
    shapes: impl IntoIterator<Item = &'a Shape>,
    size: Size,
) -> Result<String, ExportError> {
    let mut writer = SvgWriter::new();
    writer.write_document(shapes, size)?;
    writer.finish()
}

/// Coordinates print without a trailing `.0` and never as `-0`.
fn num(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

fn points_attr(vertices: &[Point]) -> String {
    vertices
        .iter()
        .map(|p| format!("{},{}", num(p.x), num(p.y)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn paint(style: &ShapeStyle) -> [(&'static str, String); 3] {
    [
        ("fill", style.fill_color.to_hex()),
        ("stroke", style.stroke_color.to_hex()),
        ("stroke-width", num(style.stroke_width)),
    ]
}

fn outline(style: &ShapeStyle) -> [(&'static str, String); 2] {
    [
        ("stroke", style.stroke_color.to_hex()),
        ("stroke-width", num(style.stroke_width)),
    ]
}

struct SvgWriter {
    writer: Writer<Vec<u8>>,
}

impl SvgWriter {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), ExportError> {
        self.writer
            .write_event(event)
            .map_err(|e| ExportError::Svg(e.to_string()))
    }

    fn start_tag(name: &str, attrs: &[(&str, String)]) -> BytesStart<'static> {
        let mut elem = BytesStart::new(name.to_string());
        for (key, value) in attrs {
            elem.push_attribute((*key, value.as_str()));
        }
        elem
    }

    /// Write a childless element.
    fn empty(&mut self, name: &str, attrs: &[(&str, String)]) -> Result<(), ExportError> {
        self.write(Event::Empty(Self::start_tag(name, attrs)))
    }

    fn write_document<'a>(
        &mut self,
        shapes: impl IntoIterator<Item = &'a Shape>,
        size: Size,
    ) -> Result<(), ExportError> {
        let root = Self::start_tag(
            "svg",
            &[
                ("xmlns", SVG_NS_URI.to_string()),
                ("width", num(size.width)),
                ("height", num(size.height)),
            ],
        );
        self.write(Event::Start(root))?;
        self.empty(
            "rect",
            &[
                ("id", "background".to_string()),
                ("x", "0".to_string()),
                ("y", "0".to_string()),
                ("width", num(size.width)),
                ("height", num(size.height)),
                ("fill", BACKGROUND.to_hex()),
            ],
        )?;

        let mut count = 0usize;
        for shape in shapes {
            self.write_shape(shape)?;
            count += 1;
        }
        log::debug!("Wrote {count} shapes as SVG");

        self.write(Event::End(BytesEnd::new("svg")))
    }

    fn write_shape(&mut self, shape: &Shape) -> Result<(), ExportError> {
        let style = shape.style();
        match shape {
            Shape::Rect(rect) => {
                let r = rect.as_rect();
                let mut attrs = vec![
                    ("x", num(r.x0)),
                    ("y", num(r.y0)),
                    ("width", num(r.width())),
                    ("height", num(r.height())),
                ];
                attrs.extend(paint(style));
                self.empty("rect", &attrs)
            }
            Shape::Circle(circle) => {
                let mut attrs = vec![
                    ("cx", num(circle.center.x)),
                    ("cy", num(circle.center.y)),
                    ("r", num(circle.radius)),
                ];
                attrs.extend(paint(style));
                self.empty("circle", &attrs)
            }
            Shape::Oval(oval) => {
                let center = oval.frame.center();
                let radii = oval.frame.radii();
                let mut attrs = vec![
                    ("cx", num(center.x)),
                    ("cy", num(center.y)),
                    ("rx", num(radii.x)),
                    ("ry", num(radii.y)),
                ];
                attrs.extend(paint(style));
                self.empty("ellipse", &attrs)
            }
            Shape::Diamond(diamond) => self.polygon(&diamond.vertices(), style),
            Shape::Parallelogram(shape) => self.polygon(&shape.vertices(), style),
            Shape::Line(line) => self.segment(line.start, line.end, style),
            Shape::Arrow(arrow) => {
                self.segment(arrow.start, arrow.end, style)?;
                let [left, right] = geometry::arrowhead(arrow.start, arrow.end);
                let (ex, ey) = (num(arrow.end.x), num(arrow.end.y));
                let d = format!(
                    "M{ex},{ey} L{},{} M{ex},{ey} L{},{}",
                    num(left.x),
                    num(left.y),
                    num(right.x),
                    num(right.y)
                );
                let mut attrs = vec![("d", d)];
                attrs.extend(outline(style));
                attrs.push(("fill", "none".to_string()));
                self.empty("path", &attrs)
            }
            Shape::Text(text) => {
                let elem = Self::start_tag(
                    "text",
                    &[
                        ("x", num(text.anchor.x)),
                        ("y", num(text.anchor.y)),
                        ("fill", style.stroke_color.to_hex()),
                        ("font-family", FONT_FAMILY.to_string()),
                        ("font-weight", "bold".to_string()),
                        ("font-size", num(FONT_SIZE)),
                    ],
                );
                self.write(Event::Start(elem))?;
                self.write(Event::Text(BytesText::new(&text.content)))?;
                self.write(Event::End(BytesEnd::new("text")))
            }
        }
    }

    fn polygon(&mut self, vertices: &[Point], style: &ShapeStyle) -> Result<(), ExportError> {
        let mut attrs = vec![("points", points_attr(vertices))];
        attrs.extend(paint(style));
        self.empty("polygon", &attrs)
    }

    fn segment(&mut self, start: Point, end: Point, style: &ShapeStyle) -> Result<(), ExportError> {
        let mut attrs = vec![
            ("x1", num(start.x)),
            ("y1", num(start.y)),
            ("x2", num(end.x)),
            ("y2", num(end.y)),
        ];
        attrs.extend(outline(style));
        self.empty("line", &attrs)
    }

    fn finish(self) -> Result<String, ExportError> {
        String::from_utf8(self.writer.into_inner()).map_err(|e| ExportError::Svg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoxFrame;
    use crate::shapes::{
        Arrow, Circle, Diamond, Line, Oval, Parallelogram, Rectangle, ShapeKind, Text,
    };
    use quick_xml::Reader;
    use std::collections::HashMap;

    #[derive(Debug)]
    struct Element {
        name: String,
        attrs: HashMap<String, String>,
        text: String,
    }

    impl Element {
        fn num(&self, key: &str) -> f64 {
            self.attrs[key].parse().unwrap()
        }

        fn points(&self) -> Vec<Point> {
            self.attrs["points"]
                .split(' ')
                .map(|pair| {
                    let (x, y) = pair.split_once(',').unwrap();
                    Point::new(x.parse().unwrap(), y.parse().unwrap())
                })
                .collect()
        }
    }

    fn parse(svg: &str) -> Vec<Element> {
        let mut reader = Reader::from_str(svg);
        reader.config_mut().trim_text(true);
        let mut elements: Vec<Element> = Vec::new();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_event_into(&mut buf).unwrap() {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let attrs = e
                        .attributes()
                        .map(|a| {
                            let a = a.unwrap();
                            (
                                String::from_utf8(a.key.as_ref().to_vec()).unwrap(),
                                a.unescape_value().unwrap().into_owned(),
                            )
                        })
                        .collect();
                    elements.push(Element {
                        name: String::from_utf8(e.name().as_ref().to_vec()).unwrap(),
                        attrs,
                        text: String::new(),
                    });
                }
                Event::Text(ref t) => {
                    if let Some(last) = elements.last_mut() {
                        last.text.push_str(&t.unescape().unwrap());
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        elements
    }

    fn styled(mut shape: Shape) -> Shape {
        *shape.style_mut() = ShapeStyle::new(
            SerializableColor::rgb(0xff, 0x88, 0x00),
            SerializableColor::rgb(0x00, 0x88, 0xff),
            3.0,
        );
        shape
    }

    fn path_points(d: &str) -> Vec<Point> {
        d.split(' ')
            .map(|step| {
                let (x, y) = step[1..].split_once(',').unwrap();
                Point::new(x.parse().unwrap(), y.parse().unwrap())
            })
            .collect()
    }

    /// Rebuild the shape geometry at the front of `elements`, returning how
    /// many elements it consumed. An arrow is a `line` followed by its head `path`.
    fn read_back(elements: &[Element]) -> (Shape, usize) {
        let element = &elements[0];
        if element.name == "line" && elements.get(1).is_some_and(|next| next.name == "path") {
            let start = Point::new(element.num("x1"), element.num("y1"));
            let end = Point::new(element.num("x2"), element.num("y2"));
            let head = path_points(&elements[1].attrs["d"]);
            assert_eq!(head.len(), 4);
            assert_eq!(head[0], end);
            assert_eq!(head[2], end);
            assert_eq!([head[1], head[3]], geometry::arrowhead(start, end));
            return (Shape::Arrow(Arrow::new(start, end)), 2);
        }
        let shape = match element.name.as_str() {
            "rect" => Shape::Rect(Rectangle::new(
                Point::new(element.num("x"), element.num("y")),
                element.num("width"),
                element.num("height"),
            )),
            "circle" => Shape::Circle(Circle::new(
                Point::new(element.num("cx"), element.num("cy")),
                element.num("r"),
            )),
            "ellipse" => {
                let (rx, ry) = (element.num("rx"), element.num("ry"));
                Shape::Oval(Oval::new(
                    Point::new(element.num("cx") - rx, element.num("cy") - ry),
                    rx * 2.0,
                    ry * 2.0,
                ))
            }
            "polygon" => {
                let v = element.points();
                // Diamond vertices sit on edge midpoints; a parallelogram's first vertex is a corner
                if v[0].y == v[1].y {
                    Shape::Parallelogram(Parallelogram::new(
                        Point::new(v[3].x, v[0].y),
                        v[1].x - v[3].x,
                        v[3].y - v[0].y,
                    ))
                } else {
                    Shape::Diamond(Diamond::new(
                        Point::new(v[3].x, v[0].y),
                        v[1].x - v[3].x,
                        v[2].y - v[0].y,
                    ))
                }
            }
            "line" => Shape::Line(Line::new(
                Point::new(element.num("x1"), element.num("y1")),
                Point::new(element.num("x2"), element.num("y2")),
            )),
            "text" => Shape::Text(Text::new(
                Point::new(element.num("x"), element.num("y")),
                element.text.clone(),
            )),
            other => panic!("unexpected element {other}"),
        };
        (shape, 1)
    }

    fn same_geometry(a: &Shape, b: &Shape) -> bool {
        match (a, b) {
            (Shape::Circle(a), Shape::Circle(b)) => a.center == b.center && a.radius == b.radius,
            (Shape::Line(a), Shape::Line(b)) => a.start == b.start && a.end == b.end,
            (Shape::Arrow(a), Shape::Arrow(b)) => a.start == b.start && a.end == b.end,
            (Shape::Text(a), Shape::Text(b)) => a.anchor == b.anchor && a.content == b.content,
            // Box frames are exported normalized
            _ => {
                a.kind() == b.kind()
                    && a.frame().map(BoxFrame::normalized) == b.frame().map(BoxFrame::normalized)
            }
        }
    }

    #[test]
    fn test_empty_document() {
        let shapes: Vec<Shape> = Vec::new();
        let svg = to_svg(&shapes, Size::new(800.0, 600.0)).unwrap();
        let elements = parse(&svg);
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].name, "svg");
        assert_eq!(elements[0].attrs["xmlns"], SVG_NS_URI);
        assert_eq!(elements[0].attrs["width"], "800");
        assert_eq!(elements[0].attrs["height"], "600");
        assert_eq!(elements[1].attrs["id"], "background");
        assert_eq!(elements[1].attrs["fill"], "#111111");
    }

    #[test]
    fn test_rect_normalized() {
        let shape = Shape::Rect(Rectangle::new(Point::new(100.0, 100.0), -60.0, -40.0));
        let svg = to_svg([&shape], Size::new(800.0, 600.0)).unwrap();
        let elements = parse(&svg);
        let rect = &elements[2];
        assert_eq!(rect.attrs["x"], "40");
        assert_eq!(rect.attrs["y"], "60");
        assert_eq!(rect.attrs["width"], "60");
        assert_eq!(rect.attrs["height"], "40");
    }

    #[test]
    fn test_style_attributes_verbatim() {
        let shape = styled(Shape::Circle(Circle::new(Point::new(20.0, 20.0), 10.0)));
        let svg = to_svg([&shape], Size::new(100.0, 100.0)).unwrap();
        let elements = parse(&svg);
        let circle = &elements[2];
        assert_eq!(circle.attrs["fill"], "#ff8800");
        assert_eq!(circle.attrs["stroke"], "#0088ff");
        assert_eq!(circle.attrs["stroke-width"], "3");
    }

    #[test]
    fn test_line_has_no_fill() {
        let shape = Shape::Line(Line::new(Point::new(0.0, 0.0), Point::new(40.0, 20.0)));
        let svg = to_svg([&shape], Size::new(100.0, 100.0)).unwrap();
        let elements = parse(&svg);
        let line = &elements[2];
        assert_eq!(line.name, "line");
        assert!(!line.attrs.contains_key("fill"));
    }

    #[test]
    fn test_arrow_emits_line_and_head() {
        let shape = Shape::Arrow(Arrow::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0)));
        let svg = to_svg([&shape], Size::new(200.0, 200.0)).unwrap();
        let elements = parse(&svg);
        assert_eq!(elements[2].name, "line");
        assert_eq!(elements[3].name, "path");
        assert_eq!(elements[3].attrs["fill"], "none");
        let d = &elements[3].attrs["d"];
        assert!(d.starts_with("M100,0 L"));
        assert_eq!(d.matches("M100,0").count(), 2);
    }

    #[test]
    fn test_text_escaped() {
        let shape = Shape::Text(Text::new(Point::new(10.0, 20.0), "a<b & \"c\"".to_string()));
        let svg = to_svg([&shape], Size::new(100.0, 100.0)).unwrap();
        assert!(svg.contains("a&lt;b &amp;"));
        let elements = parse(&svg);
        let text = &elements[2];
        assert_eq!(text.text, "a<b & \"c\"");
        assert_eq!(text.attrs["font-family"], "Courier New");
        assert_eq!(text.attrs["font-weight"], "bold");
        assert_eq!(text.attrs["font-size"], "16");
        assert_eq!(text.attrs["fill"], "#ffffff");
    }

    #[test]
    fn test_round_trip_every_kind() {
        let shapes = vec![
            styled(Shape::Rect(Rectangle::new(Point::new(20.0, 40.0), 100.0, 60.0))),
            styled(Shape::Circle(Circle::new(Point::new(200.0, 200.0), 40.0))),
            styled(Shape::Oval(Oval::new(Point::new(300.0, 20.0), 80.0, 40.0))),
            styled(Shape::Diamond(Diamond::new(Point::new(40.0, 300.0), 80.0, 60.0))),
            styled(Shape::Parallelogram(Parallelogram::new(Point::new(200.0, 300.0), 100.0, 40.0))),
            styled(Shape::Line(Line::new(Point::new(0.0, 0.0), Point::new(60.0, 80.0)))),
            styled(Shape::Arrow(Arrow::new(Point::new(500.0, 100.0), Point::new(420.0, 160.0)))),
            styled(Shape::Text(Text::new(Point::new(400.0, 400.0), "Start".to_string()))),
            styled(Shape::Rect(Rectangle::new(Point::new(700.0, 500.0), -60.0, -40.0))),
            styled(Shape::Oval(Oval::new(Point::new(600.0, 300.0), -80.0, 40.0))),
            styled(Shape::Diamond(Diamond::new(Point::new(300.0, 500.0), -40.0, -20.0))),
            styled(Shape::Parallelogram(Parallelogram::new(Point::new(500.0, 500.0), 60.0, -30.0))),
        ];
        let svg = to_svg(&shapes, Size::new(800.0, 600.0)).unwrap();
        let elements = parse(&svg);
        // Arrows emit two elements
        assert_eq!(elements.len(), shapes.len() + 3);

        let mut rest = &elements[2..];
        for original in &shapes {
            let (rebuilt, consumed) = read_back(rest);
            assert!(
                same_geometry(original, &rebuilt),
                "{:?} came back as {:?}",
                original.kind(),
                rebuilt
            );
            if original.kind() != ShapeKind::Text {
                assert_eq!(rest[0].attrs["stroke"], "#0088ff");
            }
            if let Some(frame) = original.frame() {
                assert_eq!(rebuilt.frame().map(BoxFrame::normalized), Some(frame.normalized()));
            }
            rest = &rest[consumed..];
        }
        assert!(rest.is_empty());
    }

    #[test]
    fn test_negative_oval_and_polygon_frames() {
        let oval = Shape::Oval(Oval::new(Point::new(100.0, 100.0), -80.0, -40.0));
        let svg = to_svg([&oval], Size::new(200.0, 200.0)).unwrap();
        let elements = parse(&svg);
        let ellipse = &elements[2];
        assert_eq!(ellipse.attrs["cx"], "60");
        assert_eq!(ellipse.attrs["cy"], "80");
        assert_eq!(ellipse.attrs["rx"], "40");
        assert_eq!(ellipse.attrs["ry"], "20");

        let frame = BoxFrame::new(Point::new(100.0, 100.0), -40.0, -20.0);
        let diamond = Shape::Diamond(Diamond::new(frame.origin, frame.width, frame.height));
        let svg = to_svg([&diamond], Size::new(200.0, 200.0)).unwrap();
        let elements = parse(&svg);
        let polygon = &elements[2];
        assert_eq!(polygon.points().len(), 4);
        assert_eq!(polygon.points()[0], Point::new(80.0, 100.0));
    }
}
