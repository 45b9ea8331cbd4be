#![allow(dead_code)]
// Not every test binary uses every stub

pub const MEASUREMENT: &str = r#"
{
  "content-spec": "urn:spec://eclipse.org/unide/measurement-message#v2",
  "device": {
    "deviceID": "a4927dad-58d4-4580-b460-79cefd56775b",
    "operationalStatus": "normal",
    "metaData": {
      "swVersion": "2.0.3.13",
      "swBuildID": "41535"
    }
  },
  "part": {
    "partTypeID": "F00VH07328",
    "partID": "420003844",
    "result": "NOK",
    "code": "HUH289",
    "metaData": {
      "toolID": "32324-432143"
    }
  },
  "measurements": [
    {
      "ts": "2002-05-30T09:30:10.123+02:00",
      "result": "NOK",
      "code": "0000 EE01",
      "series": {
        "$_time": [0, 23, 24],
        "force": [26, 23, 24],
        "pressure": [52.4, 46.32, 44.2432],
        "temperature": [45.4243, 46.42342, 44.2432]
      },
      "limits": {
        "temperature": {
          "lowerError": 44,
          "lowerWarning": 46,
          "upperError": 55,
          "upperWarning": 52
        }
      }
    },
    {
      "ts": "2002-05-30T09:30:10.123+02:00",
      "series": {
        "$_time": [0, 13, 26],
        "pressure": [52.4, null, 44.2432]
      }
    }
  ]
}
"#;

pub const MESSAGE: &str = r#"
{
  "content-spec": "urn:spec://eclipse.org/unide/machine-message#v2",
  "device": {
    "deviceID": "2ca5158b-8350-4592-bff9-755194497d4e",
    "operationalStatus": "MM-1",
    "metaData": {
      "firmware": "1.2.3"
    }
  },
  "messages": [
    {
      "ts": "2002-05-30T09:30:10.123+02:00",
      "origin": "sensor-id-992.2393.22",
      "type": "DEVICE",
      "severity": "HIGH",
      "code": "190ABT",
      "title": "control board damaged",
      "description": "Electronic control board or its electrical connections are damaged",
      "hint": "Check the control board",
      "metaData": {
        "firmware": "20130304_22.020"
      }
    },
    {
      "ts": "2002-05-30T09:30:10.125+02:00",
      "type": "TECHNICAL_INFO",
      "severity": "LOW",
      "code": "33-02"
    }
  ]
}
"#;

pub const PROCESS: &str = r#"
{
  "content-spec": "urn:spec://eclipse.org/unide/process-message#v2",
  "device": {
    "deviceID": "a4927dad-58d4-4580-b460-79cefd56775b",
    "operationalStatus": "normal",
    "metaData": {
      "swVersion": "2.0.3.13",
      "swBuildId": "41535"
    }
  },
  "part": {
    "type": "SINGLE",
    "partTypeID": "F00VH07328",
    "partID": "420003844",
    "result": "NOK",
    "code": "HUH289",
    "metaData": {
      "toolId": "32324-432143"
    }
  },
  "process": {
    "ts": "2002-05-30T09:30:10.123+02:00",
    "externalProcessId": "b4927dad-58d4-4580-b460-79cefd56775b",
    "result": "NOK",
    "shutoffPhase": "phase 2",
    "program": {
      "id": "1",
      "name": "Programm 1",
      "lastChangedDate": "2002-05-30T09:30:10.123+02:00"
    },
    "shutoffValues": {
      "force": {
        "ts": "2002-05-30T09:30:10.123+02:00",
        "value": 24,
        "upperError": 26,
        "lowerError": 22,
        "upperWarning": 25,
        "lowerWarning": 23
      },
      "pressure": {
        "value": 50,
        "upperError": 52,
        "lowerError": 48
      }
    },
    "metaData": {
      "maxDuration": "30min",
      "escalation": "shift leader"
    }
  },
  "measurements": [
    {
      "ts": "2002-05-30T09:30:10.123+02:00",
      "phase": "phase 1",
      "name": "heating up",
      "result": "OK",
      "code": "0000 EE01",
      "limits": {
        "temperature": {
          "upperError": 4444,
          "lowerError": 44,
          "upperWarning": 2222,
          "lowerWarning": 46,
          "target": 35
        }
      },
      "specialValues": [
        {
          "time": 2,
          "name": "turning point",
          "value": {
            "pressure": 24,
            "force": 50
          }
        }
      ],
      "series": {
        "time": [0, 23, 24],
        "force": [26, 23, 24],
        "pressure": [52.4, 46.32, 44.2432],
        "temperature": [45.4243, 46.42342, 44.2432]
      }
    },
    {
      "ts": "2002-05-30T09:30:20.123+02:00",
      "phase": "phase 2",
      "name": "processing",
      "result": "OK",
      "limits": {
        "force": {
          "upperError": [27, 24, 25],
          "lowerError": [25, 22, 23]
        },
        "pressure": {
          "upperError": [54, 48, 46],
          "lowerError": [50, 44, 42]
        }
      },
      "series": {
        "time": [30, 36, 42],
        "force": [26, 23, 24],
        "pressure": [52.4, 46.32, 44.2432],
        "temperature": [45.4243, 46.42342, 44.2432]
      }
    }
  ]
}
"#;

/// A measurement payload with one problem of each sort.
pub const INVALID: &str = r#"
{
  "content-spec": "urn:spec://eclipse.org/unide/measurement-message#v2",
  "device": {
    "deviceID": "a4927dad-58d4-4580-b460-79cefd56775b-0001",
    "murx": 9
  },
  "part": {
    "partID": "P918298",
    "result": "MAYBE"
  },
  "measurements": [
    {
      "ts": "2002-05-30T09:30:10.123+02:00",
      "series": {
        "$_time": [0, 23, 24],
        "temperature": [45.4231, 46.4222]
      }
    }
  ]
}
"#;

pub const NAIVE_TIMESTAMP: &str = r#"
{
  "content-spec": "urn:spec://eclipse.org/unide/machine-message#v2",
  "device": {
    "deviceID": "2ca5158b-8350-4592-bff9-755194497d4e"
  },
  "messages": [
    {
      "ts": "2002-05-30T09:30:10.123",
      "code": "190ABT"
    }
  ]
}
"#;

pub const MALFORMED_TIMESTAMP: &str = r#"
{
  "content-spec": "urn:spec://eclipse.org/unide/machine-message#v2",
  "device": {
    "deviceID": "2ca5158b-8350-4592-bff9-755194497d4e"
  },
  "messages": [
    {
      "ts": "yesterday at noon",
      "code": "190ABT"
    }
  ]
}
"#;

pub const UNKNOWN_CONTENT_SPEC: &str = r#"
{
  "content-spec": "urn:spec://eclipse.org/unide/measurement-message#v3",
  "device": {
    "deviceID": "a4927dad-58d4-4580-b460-79cefd56775b"
  }
}
"#;
