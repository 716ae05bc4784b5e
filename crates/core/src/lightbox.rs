use stellar_protocol::{ClassName, DomCommand, InsertPosition, NodeId, StyleProperty, Tag};
use tracing::debug;

use crate::event::EventKind;
use crate::runtime::{Context, Handler};

/// A clickable photo and the source shown when it is enlarged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub node: NodeId,
    pub src: String,
}

/// Full-screen photo viewer.
#[derive(Debug)]
pub struct Lightbox {
    body: NodeId,
    photos: Vec<Photo>,
    overlay: NodeId,
    image: NodeId,
    close: NodeId,
    open: Option<usize>,
}

impl Lightbox {
    /// Build the overlay and hook up every photo. Returns `None` for pages
    /// without photos.
    pub fn install(body: NodeId, photos: Vec<Photo>, ctx: &mut Context<'_>) -> Option<Self> {
        if photos.is_empty() {
            return None;
        }
        let overlay = ctx.nodes.alloc();
        let image = ctx.nodes.alloc();
        let close = ctx.nodes.alloc();

        ctx.emit(DomCommand::CreateElement {
            node: overlay,
            parent: body,
            position: InsertPosition::Append,
            tag: Tag::Div,
            class: Some(ClassName::Lightbox),
            text: None,
            styles: vec![(StyleProperty::Display, "none".into())],
            attributes: Vec::new(),
        });
        ctx.emit(DomCommand::CreateElement {
            node: image,
            parent: overlay,
            position: InsertPosition::Append,
            tag: Tag::Img,
            class: None,
            text: None,
            styles: Vec::new(),
            attributes: vec![("alt".into(), "".into())],
        });
        ctx.emit(DomCommand::CreateElement {
            node: close,
            parent: overlay,
            position: InsertPosition::Append,
            tag: Tag::Button,
            class: Some(ClassName::LightboxClose),
            text: Some("×".into()),
            styles: Vec::new(),
            attributes: vec![("aria-label".into(), "Close".into())],
        });

        for (index, photo) in photos.iter().enumerate() {
            ctx.emit(DomCommand::style(photo.node, StyleProperty::Cursor, "pointer"));
            ctx.subscriptions
                .subscribe(EventKind::Click(photo.node), Handler::LightboxOpen(index));
        }
        ctx.subscriptions
            .subscribe(EventKind::Click(overlay), Handler::LightboxDismiss);
        ctx.subscriptions
            .subscribe(EventKind::Click(close), Handler::LightboxDismiss);
        ctx.subscriptions
            .subscribe(EventKind::Click(image), Handler::LightboxImage);

        debug!(photos = photos.len(), "Lightbox installed");
        Some(Self {
            body,
            photos,
            overlay,
            image,
            close,
            open: None,
        })
    }

    pub fn open(&mut self, index: usize, out: &mut Vec<DomCommand>) {
        let Some(photo) = self.photos.get(index) else {
            return;
        };
        out.push(DomCommand::SetAttribute {
            node: self.image,
            name: "src".into(),
            value: photo.src.as_str().into(),
        });
        out.push(DomCommand::style(self.overlay, StyleProperty::Display, "flex"));
        out.push(DomCommand::style(self.body, StyleProperty::Overflow, "hidden"));
        self.open = Some(index);
    }

    /// Returns whether the lightbox was open.
    pub fn close(&mut self, out: &mut Vec<DomCommand>) -> bool {
        if self.open.take().is_none() {
            return false;
        }
        out.push(DomCommand::style(self.overlay, StyleProperty::Display, "none"));
        out.push(DomCommand::style(self.body, StyleProperty::Overflow, ""));
        true
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn close_button(&self) -> NodeId {
        self.close
    }

    pub fn overlay(&self) -> NodeId {
        self.overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Runtime;

    fn installed(h: &mut Runtime) -> Lightbox {
        let body = h.nodes.alloc();
        let photos = vec![Photo {
            node: h.nodes.alloc(),
            src: "/photos/1.jpg".to_string(),
        }];
        match Lightbox::install(body, photos, &mut h.ctx()) {
            Some(lightbox) => lightbox,
            None => unreachable!("photos were given"),
        }
    }

    #[test]
    fn open_and_close() {
        let mut h = Runtime::default();
        let mut lightbox = installed(&mut h);
        h.drain();

        let mut out = Vec::new();
        lightbox.open(0, &mut out);
        assert!(lightbox.is_open());
        assert!(out.contains(&DomCommand::style(lightbox.overlay(), StyleProperty::Display, "flex")));

        out.clear();
        assert!(lightbox.close(&mut out));
        assert!(!lightbox.close(&mut out));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn no_photos_no_lightbox() {
        let mut h = Runtime::default();
        let body = h.nodes.alloc();
        assert!(Lightbox::install(body, Vec::new(), &mut h.ctx()).is_none());
        assert!(h.drain().is_empty());
    }

    #[test]
    fn overlay_and_close_button_dismiss() {
        let mut h = Runtime::default();
        let lightbox = installed(&mut h);
        assert_eq!(
            h.subscriptions.dispatch(EventKind::Click(lightbox.close_button())),
            vec![Handler::LightboxDismiss]
        );
        assert_eq!(
            h.subscriptions.dispatch(EventKind::Click(lightbox.overlay())),
            vec![Handler::LightboxDismiss]
        );
    }
}
