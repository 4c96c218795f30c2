//! Pure-grammar text rendering of a model.
//!
//! Output mirrors the grammar the model was declared in, with generated
//! members included, so compiled models can be diffed and inspected.

use std::fmt::Write as FmtWrite;

use crate::model::{Association, Class, Model, Property, QualifiedProperty, StereotypeRef};

/// Line-oriented text buffer for one rendered document.
pub struct PureFile {
    /// Accumulated text.
    pub buf: String,
}

impl PureFile {
    /// Starts a document with a leading `//` comment block.
    #[must_use]
    pub fn new(header: &str) -> Self {
        let mut buf = String::new();
        for line in header.lines() {
            if line.is_empty() {
                buf.push_str("//\n");
            } else {
                let _ = writeln!(buf, "// {line}");
            }
        }
        if !header.is_empty() {
            buf.push('\n');
        }
        Self { buf }
    }

    /// Appends a line.
    pub fn line(&mut self, s: &str) {
        self.buf.push_str(s);
        self.buf.push('\n');
    }

    /// Appends an indented line.
    pub fn indented(&mut self, s: &str) {
        self.buf.push_str("  ");
        self.line(s);
    }

    /// Appends an empty line.
    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// Returns the document, with exactly one trailing newline.
    #[must_use]
    pub fn finish(mut self) -> String {
        while self.buf.ends_with("\n\n") {
            self.buf.pop();
        }
        self.buf
    }
}

/// Renders every class and association in path order.
#[must_use]
pub fn render_model(model: &Model) -> String {
    let mut f = PureFile::new("");
    for class in model.classes() {
        write_class(&mut f, class);
        f.blank();
    }
    for association in model.associations() {
        write_association(&mut f, association);
        f.blank();
    }
    f.finish()
}

/// Renders a single class.
#[must_use]
pub fn render_class(class: &Class) -> String {
    let mut f = PureFile::new("");
    write_class(&mut f, class);
    f.finish()
}

fn write_class(f: &mut PureFile, class: &Class) {
    f.line(&format!("Class {}{}", stereotypes(&class.stereotypes), class.path));
    f.line("{");
    for property in &class.properties {
        f.indented(&property_line(property));
    }
    for qualified in &class.qualified_properties {
        f.indented(&qualified_line(qualified));
    }
    if !class.properties_from_associations.is_empty()
        || !class.qualified_properties_from_associations.is_empty()
    {
        f.indented("// from associations");
        for property in &class.properties_from_associations {
            f.indented(&property_line(property));
        }
        for qualified in &class.qualified_properties_from_associations {
            f.indented(&qualified_line(qualified));
        }
    }
    if !class.original_milestoned_properties.is_empty() {
        let names: Vec<&str> = class
            .original_milestoned_properties
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        f.indented(&format!("// original milestoned: {}", names.join(", ")));
    }
    f.line("}");
}

fn write_association(f: &mut PureFile, association: &Association) {
    f.line(&format!("Association {}", association.path));
    f.line("{");
    for property in &association.properties {
        f.indented(&property_line(property));
    }
    for qualified in &association.qualified_properties {
        f.indented(&qualified_line(qualified));
    }
    f.line("}");
}

fn stereotypes(stereotypes: &[StereotypeRef]) -> String {
    if stereotypes.is_empty() {
        return String::new();
    }
    let rendered: Vec<String> = stereotypes.iter().map(ToString::to_string).collect();
    format!("<<{}>> ", rendered.join(", "))
}

fn property_line(property: &Property) -> String {
    format!(
        "{}{}: {}{};",
        stereotypes(&property.stereotypes),
        property.name,
        property.generic_type,
        property.multiplicity
    )
}

fn qualified_line(qualified: &QualifiedProperty) -> String {
    let parameters: Vec<String> = qualified
        .explicit_parameters()
        .iter()
        .map(|v| format!("{}: {}{}", v.name, v.generic_type, v.multiplicity))
        .collect();
    let body: Vec<String> = qualified
        .expression_sequence
        .iter()
        .map(ToString::to_string)
        .collect();
    format!(
        "{}{}({}) {{{}}}: {}{};",
        stereotypes(&qualified.stereotypes),
        qualified.name,
        parameters.join(", "),
        body.join("; "),
        qualified.generic_type,
        qualified.multiplicity
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Multiplicity, Primitive, PropertyOwner, TypeRef};

    #[test]
    fn renders_stereotyped_class() {
        let mut class = Class::new("model::Location");
        class
            .stereotypes
            .push(StereotypeRef::new("meta::pure::profiles::temporal", "businesstemporal"));
        class.properties.push(Property::new(
            "businessDate",
            TypeRef::Primitive(Primitive::Date),
            Multiplicity::ONE,
            PropertyOwner::Class("model::Location".into()),
        ));
        let text = render_class(&class);
        assert_eq!(
            text,
            "Class <<temporal.businesstemporal>> model::Location\n{\n  businessDate: Date[1];\n}\n"
        );
    }

    #[test]
    fn finish_trims_trailing_blank_lines() {
        let mut f = PureFile::new("header");
        f.line("x");
        f.blank();
        f.blank();
        assert_eq!(f.finish(), "// header\n\nx\n");
    }
}
