//! The state passed down a certificate chain.

use crate::uri;
use crate::repository::cert::Cert;
use crate::repository::resources::ResourceSet;


//------------ ValidationContext ---------------------------------------------

/// A validated CA certificate together with its effective resources.
///
/// The effective resources differ from what the certificate lists only
/// if it inherits some of its resources. In this case, they are taken
/// from the issuer’s context. Inheritance is resolved separately for
/// AS numbers, IPv4 and IPv6 resources.
#[derive(Clone, Debug)]
pub struct ValidationContext {
    location: uri::Rsync,
    certificate: Cert,
    effective_resources: ResourceSet,
}

impl ValidationContext {
    pub fn new(
        location: uri::Rsync,
        certificate: Cert,
        effective_resources: ResourceSet,
    ) -> Self {
        ValidationContext { location, certificate, effective_resources }
    }

    /// Creates the context for a trust anchor.
    ///
    /// Trust anchors list all their resources, so the effective resources
    /// are the certificate’s own.
    pub fn trust_anchor(location: uri::Rsync, certificate: Cert) -> Self {
        let effective_resources = certificate.resources();
        ValidationContext { location, certificate, effective_resources }
    }

    /// Creates the context for a certificate issued under this context.
    pub fn create_child(
        &self, location: uri::Rsync, certificate: Cert
    ) -> Self {
        let effective_resources = certificate.effective_resources(
            &self.effective_resources
        );
        ValidationContext { location, certificate, effective_resources }
    }

    pub fn location(&self) -> &uri::Rsync {
        &self.location
    }

    pub fn certificate(&self) -> &Cert {
        &self.certificate
    }

    pub fn effective_resources(&self) -> &ResourceSet {
        &self.effective_resources
    }

    /// Returns the manifest URI of the certificate if it has one.
    pub fn manifest_uri(&self) -> Option<&uri::Rsync> {
        self.certificate.rpki_manifest()
    }

    /// Returns the repository URI of the certificate if it has one.
    pub fn repository_uri(&self) -> Option<&uri::Rsync> {
        self.certificate.ca_repository()
    }
}


//============ Tests =========================================================

#[cfg(all(test, feature = "softkeys"))]
mod signer_test {
    use std::str::FromStr;
    use crate::repository::test_util::TestCa;
    use super::*;

    #[test]
    fn child_contexts() {
        let ta = TestCa::root("AS64496, 10.0.0.0/8, 2001:db8::/32");
        let ta_context = ValidationContext::trust_anchor(
            ta.cert_uri.clone(), ta.cert.clone()
        );
        assert_eq!(
            ta_context.effective_resources(),
            &ResourceSet::from_str("AS64496, 10.0.0.0/8, 2001:db8::/32")
                .unwrap()
        );
        assert_eq!(ta_context.manifest_uri(), ta.cert.rpki_manifest());

        let inheriting = ta.child("a", 2, None);
        let context = ta_context.create_child(
            inheriting.cert_uri.clone(), inheriting.cert.clone()
        );
        assert_eq!(
            context.effective_resources(), ta_context.effective_resources()
        );

        let explicit = inheriting.child("b", 3, Some("10.1.0.0/16"));
        let context = context.create_child(
            explicit.cert_uri.clone(), explicit.cert.clone()
        );
        assert_eq!(
            context.effective_resources(),
            &ResourceSet::from_str("10.1.0.0/16").unwrap()
        );
        assert_eq!(context.location(), &explicit.cert_uri);
    }
}
